use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};
use crate::map::{DrawingMap, GridStyle};

const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Serializes a pixel buffer to a self-contained PNG data URI, the wire
/// and storage format for drawn maps.
pub fn image_to_data_uri(image: &RgbaImage) -> MapResult<String> {
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
    Ok(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(&png)))
}

/// Decodes a PNG data URI back into a pixel buffer.
pub fn image_from_data_uri(uri: &str) -> MapResult<RgbaImage> {
    let encoded = uri.strip_prefix(DATA_URI_PREFIX).ok_or(MapError::DataUri)?;
    let png = STANDARD.decode(encoded)?;
    Ok(image::load_from_memory(&png)?.to_rgba8())
}

fn default_grid_size() -> u32 {
    1
}

/// A stored map as returned by the campaign server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapRecord {
    pub id: i64,
    pub campaign_id: i64,
    pub name: String,
    pub creator_id: i64,
    pub map_base64: String,
    #[serde(default)]
    pub grid_type: GridStyle,
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,
}

/// Upload payload for `POST /api/{campaign_id}/maps`.
#[derive(Debug, Clone, Serialize)]
pub struct SaveMapRequest {
    pub campaign_id: i64,
    pub map_base64: String,
    pub name: String,
    pub grid_size: u32,
    pub grid_type: GridStyle,
}

impl SaveMapRequest {
    /// Builds the upload payload from the current drawing.
    pub fn from_map(map: &DrawingMap, campaign_id: i64) -> MapResult<Self> {
        Ok(Self {
            campaign_id,
            map_base64: image_to_data_uri(map.buffer().image())?,
            name: map.name.clone(),
            grid_size: map.grid_size,
            grid_type: map.grid_style,
        })
    }
}

/// Envelope of `GET /api/{campaign_id}/maps`.
#[derive(Debug, Clone, Deserialize)]
pub struct MapListResponse {
    pub success: bool,
    #[serde(default)]
    pub maps: Vec<MapRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Applies a fetched record to the drawing map: decoded image, grid
/// settings and name. The map is only touched once decoding succeeded.
pub fn load_record(map: &mut DrawingMap, record: &MapRecord) -> MapResult<()> {
    let image = image_from_data_uri(&record.map_base64)?;
    map.load_image(image);
    map.grid_style = record.grid_type;
    map.grid_size = record.grid_size;
    map.name = record.name.clone();
    Ok(())
}

/// Blocking JSON client for the campaign server's map endpoints.
pub struct MapClient {
    base_url: String,
    campaign_id: i64,
}

impl MapClient {
    pub fn new(base_url: &str, campaign_id: i64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            campaign_id,
        }
    }

    fn maps_url(&self) -> String {
        format!("{}/api/{}/maps", self.base_url, self.campaign_id)
    }

    /// Fetches the metadata of every stored map for the campaign.
    pub fn list_maps(&self) -> MapResult<Vec<MapRecord>> {
        let response: MapListResponse = ureq::get(&self.maps_url()).call()?.into_json()?;
        if !response.success {
            return Err(MapError::Api(
                response.error.unwrap_or_else(|| "unknown server error".to_string()),
            ));
        }
        Ok(response.maps)
    }

    /// Uploads a drawing. Local state is untouched on failure; nothing is
    /// applied until the server confirms.
    pub fn save_map(&self, request: &SaveMapRequest) -> MapResult<MapRecord> {
        let record = ureq::post(&self.maps_url())
            .send_json(request)?
            .into_json()?;
        Ok(record)
    }

    /// Removes a stored map by id.
    pub fn delete_map(&self, id: i64) -> MapResult<()> {
        ureq::delete(&format!("{}/{}", self.maps_url(), id)).call()?;
        Ok(())
    }
}
