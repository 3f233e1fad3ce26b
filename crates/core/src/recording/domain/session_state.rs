/// Observable lifecycle position of a [`Recorder`](super::recorder::Recorder).
///
/// `Faulted` is reached only when the header could not be written; the
/// output was released on the spot and the session cannot be reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unopened,
    HeaderPending,
    HeaderWritten,
    Faulted,
    Closed,
}

