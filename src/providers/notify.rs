/// Invoked on the edges of surface ownership so the rendering collaborator
/// can show or hide its control surface.
pub trait SurfaceOwnershipNotifier: Send + Sync {
    fn gained(&self);
    fn lost(&self);
}

pub struct LogNotifier;

impl SurfaceOwnershipNotifier for LogNotifier {
    fn gained(&self) {
        log::info!("gained surface ownership");
    }

    fn lost(&self) {
        log::info!("lost surface ownership");
    }
}
