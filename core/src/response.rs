//! Status-code classification and JSON decoding of payloads.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{Error, ErrorBody, Result, EXPIRED_OAUTH_TOKEN_CODE};
use crate::http::HttpResponse;

/// Maps a status code and body to the raw payload or a typed failure.
///
/// | status            | outcome                                  |
/// |-------------------|------------------------------------------|
/// | 400               | `BadRequest` with the parsed error body  |
/// | 401, Code 121     | `ExpiredOAuthToken`                      |
/// | 401, other        | `Unauthorized` with the parsed body      |
/// | 404               | `NotFound`                               |
/// | 402, 403, 405-499 | `ClientError`                            |
/// | 500-599           | `ServerError`                            |
/// | anything else     | the body, untouched                      |
pub fn classify(status: u16, body: Vec<u8>) -> Result<Vec<u8>> {
    match status {
        400 => Err(Error::BadRequest(parse_error_body(&body))),
        401 => {
            let error = parse_error_body(&body);
            if error.code == EXPIRED_OAUTH_TOKEN_CODE {
                Err(Error::ExpiredOAuthToken(error))
            } else {
                Err(Error::Unauthorized(error))
            }
        }
        404 => Err(Error::NotFound),
        402..=499 => Err(Error::ClientError { status }),
        500..=599 => Err(Error::ServerError { status }),
        _ => Ok(body),
    }
}

/// Classifies a whole response.
pub fn handle_response(response: HttpResponse) -> Result<Vec<u8>> {
    classify(response.status, response.body)
}

/// Decodes a success payload into `T`.
pub fn decode_json<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    serde_json::from_slice(payload).map_err(|e| Error::Deserialization(e.to_string()))
}

/// Error bodies that are not the documented envelope still classify; the raw
/// text becomes the message and the code is 0.
fn parse_error_body(body: &[u8]) -> ErrorBody {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "error response body is not a CreateSend error envelope");
            ErrorBody {
                code: 0,
                message: String::from_utf8_lossy(body).into_owned(),
                result_data: None,
            }
        }
    }
}
