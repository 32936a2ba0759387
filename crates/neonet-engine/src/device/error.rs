/// What the render loop does with a frame whose surface texture could not be
/// acquired.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface configured again; the next frame should succeed.
    Reconfigured,
    /// Drop this frame and carry on.
    SkipFrame,
    /// Unrecoverable; the loop stops.
    Fatal,
}
