use faultline::prelude::*;
use axum::routing::get;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Member {
    pub member_id: String,
    pub name: String,
}

/// Member lookups under the API base path
pub struct MemberController;

impl MemberController {
    pub fn router() -> Router {
        Router::new().route("/members/{id}", get(Self::get_member))
    }

    async fn get_member(Path(id): Path<String>) -> Result<Json<Member>, Exception> {
        match id.as_str() {
            "ex" => Err(Exception::runtime("wrong member")),
            "bad" => Err(IllegalArgument::new("invalid input").into()),
            "user-ex" => Err(UserException::new("user error").into()),
            _ => Ok(Json(Member {
                name: format!("hello {id}"),
                member_id: id,
            })),
        }
    }
}
