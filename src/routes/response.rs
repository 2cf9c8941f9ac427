use serde::Serialize;

use crate::song::Song;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
    },
    Upload {
        message: &'a str,
        song: Song,
    },
}
