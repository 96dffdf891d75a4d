//! Canonical textual encoding of a page's annotations.
//!
//! ```json
//! {"version":1,"width":800,"height":1000,"objects":[
//!   {"id":"…","type":"path","points":[{"x":1.0,"y":2.0}],"style":{"color":"#ff0000","width":2.0,"opacity":1.0}},
//!   {"id":"…","type":"rect","rect":{"x0":0.0,"y0":0.0,"x1":10.0,"y1":5.0},"style":{…}}
//! ]}
//! ```
//!
//! Objects are written in z-order (first is bottom-most).

use serde::{Deserialize, Serialize};

use crate::backend::PageDimensions;
use crate::canvas::{PageCanvasState, Shape, VectorObject};
use crate::error::{AppError, AppResult, ParseError};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct PayloadRef<'a> {
    version: u32,
    width: u32,
    height: u32,
    objects: &'a [VectorObject],
}

#[derive(Deserialize)]
struct Header {
    version: u32,
}

#[derive(Deserialize)]
struct Payload {
    width: u32,
    height: u32,
    #[serde(default)]
    objects: Vec<VectorObject>,
}

pub fn serialize(state: &PageCanvasState) -> AppResult<String> {
    let payload = PayloadRef {
        version: FORMAT_VERSION,
        width: state.size.width,
        height: state.size.height,
        objects: &state.objects,
    };
    serde_json::to_string(&payload)
        .map_err(|err| AppError::invalid_argument(format!("failed to encode annotations: {err}")))
}

pub fn deserialize(raw: &str) -> Result<PageCanvasState, ParseError> {
    let header = serde_json::from_str::<Header>(raw)?;
    if header.version != FORMAT_VERSION {
        return Err(ParseError::UnsupportedVersion(header.version));
    }

    let payload = serde_json::from_str::<Payload>(raw)?;
    if payload.width == 0 || payload.height == 0 {
        return Err(ParseError::InvalidSize {
            width: payload.width,
            height: payload.height,
        });
    }
    for (index, object) in payload.objects.iter().enumerate() {
        validate_object(object).map_err(|reason| ParseError::InvalidObject {
            index,
            reason: reason.to_string(),
        })?;
    }

    Ok(PageCanvasState {
        size: PageDimensions::new(payload.width, payload.height),
        objects: payload.objects,
    })
}

fn validate_object(object: &VectorObject) -> Result<(), &'static str> {
    let style = &object.style;
    if !style.width.is_finite() || style.width <= 0.0 {
        return Err("stroke width must be a positive finite value");
    }
    if !style.opacity.is_finite() || !(0.0..=1.0).contains(&style.opacity) {
        return Err("opacity must be within 0..=1");
    }

    match &object.shape {
        Shape::Path { points } => {
            if points.is_empty() {
                return Err("path has no points");
            }
            if points.iter().any(|point| !point.is_finite()) {
                return Err("path point is not finite");
            }
        }
        Shape::Rect { rect } => {
            if ![rect.x0, rect.y0, rect.x1, rect.y1]
                .iter()
                .all(|value| value.is_finite())
            {
                return Err("rect corner is not finite");
            }
        }
    }
    Ok(())
}
