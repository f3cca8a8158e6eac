use rust_embed::RustEmbed;
use warp::{filters::path::Tail, reply::Response, Filter, Rejection, Reply};

/// Static dashboard files, compiled into the binary.
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/web/"]
struct Dashboard;

fn serve(path: &str) -> Result<Response, Rejection> {
    let asset = Dashboard::get(path).ok_or_else(warp::reject::not_found)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Ok(
        warp::reply::with_header(asset.data.into_owned(), "content-type", mime.to_string())
            .into_response(),
    )
}

/// GET / and GET /assets/<file>
pub fn dashboard_routes() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .and_then(|| async move { serve("index.html") });

    let files = warp::path("assets")
        .and(warp::path::tail())
        .and(warp::get())
        .and_then(|tail: Tail| async move { serve(tail.as_str()) });

    index.or(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp::http::StatusCode;

    #[tokio::test]
    async fn test_index_is_served_as_html() {
        let res = warp::test::request().path("/").reply(&dashboard_routes()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let content_type = res.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
        assert!(String::from_utf8_lossy(res.body()).contains("<html"));
    }

    #[tokio::test]
    async fn test_unknown_asset_is_rejected() {
        let res = warp::test::request()
            .path("/assets/missing.js")
            .reply(&dashboard_routes())
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
