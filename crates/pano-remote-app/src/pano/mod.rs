pub mod asset;
pub mod geometry;
pub mod view;

use asset::VideoAsset;
use geometry::EquirectGeometry;
use view::RectilinearView;

/// Source, geometry and view rendered together.
pub struct Scene {
    pub geometry: EquirectGeometry,
    pub view: RectilinearView,
    pub asset: VideoAsset,
    active: bool,
}

impl Scene {
    pub fn new(geometry: EquirectGeometry, view: RectilinearView, asset: VideoAsset) -> Self {
        Self {
            geometry,
            view,
            asset,
            active: false,
        }
    }

    /// Make this the displayed scene. Returns whether this call activated it.
    pub fn switch_to(&mut self) -> bool {
        if self.active {
            return false;
        }
        log::info!(
            "Scene active (fov {:.1}°, {} level{})",
            self.view.fov.to_degrees(),
            self.geometry.levels().len(),
            if self.geometry.levels().len() == 1 { "" } else { "s" }
        );
        self.active = true;
        true
    }
}
