use std::f64::consts::{FRAC_PI_4, TAU};

/// Latitude at which the Mercator square ends
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy)]
pub struct MercatorConfig {
    /// Pixels per radian of longitude
    pub scale: f64,
    /// Pixel position of the projected center
    pub translate: [f64; 2],
    /// (longitude, latitude) in degrees placed at `translate`
    pub center: [f64; 2],
}

impl Default for MercatorConfig {
    fn default() -> Self {
        Self {
            scale: 961.0 / TAU,
            translate: [480.0, 250.0],
            center: [0.0, 0.0],
        }
    }
}

/// Spherical Mercator projection from (longitude, latitude) degrees to pixels.
#[derive(Debug, Clone, Copy)]
pub struct MercatorProjection {
    scale: f64,
    translate: [f64; 2],
    center: [f64; 2],
}

fn raw(lon: f64, lat: f64) -> [f64; 2] {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let lambda = lon.to_radians();
    let phi = lat.to_radians();
    [lambda, (FRAC_PI_4 + phi / 2.0).tan().ln()]
}

impl Default for MercatorProjection {
    fn default() -> Self {
        Self::new(&MercatorConfig::default())
    }
}

impl MercatorProjection {
    pub fn new(config: &MercatorConfig) -> Self {
        Self {
            scale: config.scale,
            translate: config.translate,
            center: raw(config.center[0], config.center[1]),
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> [f64; 2] {
        self.translate
    }

    /// Projects a point, or `None` for non-finite input.
    ///
    /// Latitudes beyond ±85.05° are clamped to the edge of the map.
    pub fn project(&self, lon: f64, lat: f64) -> Option<[f64; 2]> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let [x, y] = raw(lon, lat);
        Some([
            self.translate[0] + self.scale * (x - self.center[0]),
            self.translate[1] - self.scale * (y - self.center[1]),
        ])
    }

    /// Adjusts scale and translation so the given points fill the extent
    /// `[[x0, y0], [x1, y1]]`, centered along the slack dimension.
    pub fn fit_extent(
        mut self,
        extent: [[f64; 2]; 2],
        points: impl IntoIterator<Item = [f64; 2]>,
    ) -> Self {
        let bounds = points
            .into_iter()
            .filter(|[lon, lat]| lon.is_finite() && lat.is_finite())
            .map(|[lon, lat]| raw(lon, lat))
            .fold(None, |acc: Option<[f64; 4]>, [x, y]| match acc {
                None => Some([x, y, x, y]),
                Some([x0, y0, x1, y1]) => Some([x0.min(x), y0.min(y), x1.max(x), y1.max(y)]),
            });

        let Some([x0, y0, x1, y1]) = bounds else {
            return self;
        };

        let w = extent[1][0] - extent[0][0];
        let h = extent[1][1] - extent[0][1];
        let kx = if x1 > x0 { w / (x1 - x0) } else { f64::INFINITY };
        let ky = if y1 > y0 { h / (y1 - y0) } else { f64::INFINITY };
        let k = kx.min(ky);
        if !k.is_finite() {
            return self;
        }

        self.scale = k;
        self.center = [0.0, 0.0];
        self.translate = [
            extent[0][0] + (w - k * (x0 + x1)) / 2.0,
            extent[0][1] + (h + k * (y0 + y1)) / 2.0,
        ];
        self
    }

    pub fn fit_size(
        self,
        width: f64,
        height: f64,
        points: impl IntoIterator<Item = [f64; 2]>,
    ) -> Self {
        self.fit_extent([[0.0, 0.0], [width, height]], points)
    }
}
