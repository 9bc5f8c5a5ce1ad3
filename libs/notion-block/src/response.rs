use crate::BlockError;

type Response<T> = Result<T, BlockError>;

pub trait IntoResponse<T> {
    fn into_response(self, message: &str) -> Response<T>;
}

impl<T> IntoResponse<T>
    for Result<T, serde_path_to_error::Error<serde_json::Error>>
{
    fn into_response(self, message: &str) -> Response<T> {
        self.map_err(|e| {
            let path = e.path().to_string();
            let path = if path.is_empty() || path == "." {
                "<root>".to_string()
            } else {
                path
            };
            BlockError::Decode {
                message: message.to_string(),
                path,
                source: e.into_inner(),
            }
        })
    }
}

impl<T> IntoResponse<T> for Result<T, serde_json::Error> {
    fn into_response(self, message: &str) -> Response<T> {
        self.map_err(|e| BlockError::Encode {
            message: message.to_string(),
            source: e,
        })
    }
}
