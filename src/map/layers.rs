use crate::map::projection::TileId;

/// A raster tile provider described by a URL template.
///
/// Recognized placeholders are `{z}`, `{x}`, `{y}`, `{s}` (subdomain) and
/// `{r}` (`@2x` on high-density displays).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSource {
    pub url_template: &'static str,
    pub subdomains: &'static [&'static str],
    pub max_zoom: u8,
    pub opacity: f32,
    pub attribution: &'static str,
}

impl TileSource {
    pub fn tile_url(&self, tile: TileId, retina: bool) -> String {
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            self.subdomains[((tile.x + tile.y) as usize) % self.subdomains.len()]
        };

        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
            .replace("{r}", if retina { "@2x" } else { "" })
    }
}

const GEBCO_GRAY: TileSource = TileSource {
    url_template: "https://tiles.arcgis.com/tiles/C8EMgrsFcRFL6LrL/arcgis/rest/services/GEBCO_grayscale_basemap_NCEI/MapServer/tile/{z}/{y}/{x}",
    subdomains: &[],
    max_zoom: 12,
    opacity: 0.9,
    attribution: "GEBCO & NOAA NCEI",
};

const CARTO_LIGHT: TileSource = TileSource {
    url_template: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
    subdomains: &["a", "b", "c"],
    max_zoom: 19,
    opacity: 1.0,
    attribution: "© OSM © Carto",
};

/// Background imagery; exactly one is shown at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BaseLayer {
    #[default]
    GebcoGray,
    CartoLight,
}

impl BaseLayer {
    pub const ALL: [BaseLayer; 2] = [BaseLayer::GebcoGray, BaseLayer::CartoLight];

    pub fn label(&self) -> &'static str {
        match self {
            BaseLayer::GebcoGray => "GEBCO gris (NOAA)",
            BaseLayer::CartoLight => "Fond clair (Carto)",
        }
    }

    pub fn source(&self) -> &'static TileSource {
        match self {
            BaseLayer::GebcoGray => &GEBCO_GRAY,
            BaseLayer::CartoLight => &CARTO_LIGHT,
        }
    }
}

/// Which layers the layer control currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerVisibility {
    pub base: BaseLayer,
    pub tracks: bool,
    pub media: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self { base: BaseLayer::default(), tracks: true, media: true }
    }
}

impl LayerVisibility {
    pub const TRACKS_LABEL: &'static str = "Traces bateau";
    pub const MEDIA_LABEL: &'static str = "Médias";
}
