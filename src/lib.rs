pub mod config;
pub mod dispatch;
pub mod embed;
pub mod error;
pub mod message;
pub mod notify;
pub mod preview;
pub mod session;
pub mod validate;
pub mod webhook;

pub use config::Config;
pub use dispatch::{DispatchRequest, Outcome, Reply, Severity, Status, Transport, TransportError};
pub use embed::{
    Author, Embed, EmbedField, FieldUpdate, Footer, MediaRef, ScalarEdit, SubObjectUpdate,
};
pub use message::{deserialize, serialize, Payload, SenderIdentity};
pub use preview::{project, Preview, Projector};
pub use session::Session;
pub use validate::{Color, Timestamp};

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        mod bot;

        use worker::{
            console_error, console_log, event, Context, Env, Request, Response, Result, Router,
        };

        fn respond(result: std::result::Result<Response, error::Http>) -> Result<Response> {
            match result {
                Ok(response) => {
                    console_log!("Response status : {}", response.status_code());
                    Ok(response)
                }
                Err(httperr) => {
                    console_error!("Error response : {}", httperr.to_string());
                    Response::error(httperr.to_string(), httperr.status as u16)
                }
            }
        }

        #[event(fetch)]
        pub async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
            console_log!("{} {}", req.method().to_string(), req.path());

            Router::new()
                .post_async("/preview", |req, _ctx| async move {
                    respond(bot::App::new(req).preview().await)
                })
                .post_async("/payload", |req, _ctx| async move {
                    respond(bot::App::new(req).payload().await)
                })
                .post_async("/send", |req, _ctx| async move {
                    respond(bot::App::new(req).send().await)
                })
                .run(req, env)
                .await
        }
    }
}
