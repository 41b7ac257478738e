use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;
use warp::Filter;

use crate::auth;
use crate::session::Session;

/// Address the provider redirects back to after login.
pub fn callback_page(port: u16) -> String {
    format!("http://127.0.0.1:{}/callback", port)
}

pub fn routes(
    session: Session,
    dist_dir: PathBuf,
    port: u16,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let health_route = warp::path("health")
        .and(warp::path::end())
        .map(|| "Server is running");

    let callback_route = warp::path("callback")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(warp::any().map(move || session.clone()))
        .and_then(move |params: HashMap<String, String>, session: Session| {
            handle_callback(params, session, port)
        });

    // Serve index.html at the root path ("/")
    let index = warp::path::end().and(warp::fs::file(dist_dir.join("index.html")));
    let static_files = warp::fs::dir(dist_dir);

    index.or(health_route).or(callback_route).or(static_files)
}

async fn handle_callback(
    params: HashMap<String, String>,
    session: Session,
    port: u16,
) -> Result<warp::reply::Html<&'static str>, Infallible> {
    let logged_in = match Url::parse_with_params(&callback_page(port), params.iter()) {
        Ok(page) => auth::accept_callback(&session, &page).await,
        Err(e) => {
            log::error!("bad callback url: {}", e);
            false
        }
    };

    let body = if logged_in {
        "<p>Logged in with Openrouter. You can return to PromptMesh.</p>"
    } else {
        "<p>Openrouter login did not complete. Try again from PromptMesh.</p>"
    };
    Ok(warp::reply::html(body))
}

pub async fn start_server(session: Session, dist_dir: PathBuf, port: u16) {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    log::info!("Starting server at http://{}", addr);

    warp::serve(routes(session, dist_dir, port)).run(addr).await;
}
