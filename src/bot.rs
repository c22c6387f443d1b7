use chrono::{FixedOffset, Offset, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use worker::Response as Res;
use worker::{console_error, console_log, Request};

use crate::config::Config;
use crate::dispatch::{DispatchRequest, Outcome};
use crate::error;
use crate::message::{self, Payload};
use crate::preview::Projector;
use crate::webhook;

#[derive(Deserialize)]
struct SendBody {
    #[serde(default)]
    webhook: String,
    #[serde(flatten)]
    payload: Payload,
}

pub struct App {
    req: Request,
    config: Config,
}

impl App {
    pub fn new(req: Request) -> App {
        App {
            req,
            config: Config::default(),
        }
    }

    /// Minutes east of UTC from `?offset=`, so timestamps render in the caller's zone.
    fn viewer_offset(&self) -> FixedOffset {
        let utc = Utc.fix();
        let Ok(url) = self.req.url() else {
            return utc;
        };
        url.query_pairs()
            .find(|(key, _)| key == "offset")
            .and_then(|(_, minutes)| minutes.parse::<i32>().ok())
            .and_then(|minutes| minutes.checked_mul(60))
            .and_then(FixedOffset::east_opt)
            .unwrap_or(utc)
    }

    async fn body<T: DeserializeOwned>(&mut self) -> Result<T, error::General> {
        let body = self.req.text().await?;
        console_log!("Request body : {}", body);
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn preview(&mut self) -> Result<Res, error::Http> {
        let offset = self.viewer_offset();
        let (embed, identity) = message::deserialize(self.body::<Payload>().await?)?;
        Ok(Res::from_json(
            &Projector::with_offset(offset).project(&embed, &identity),
        )?)
    }

    pub async fn payload(&mut self) -> Result<Res, error::Http> {
        let (embed, identity) = message::deserialize(self.body::<Payload>().await?)?;
        Ok(Res::from_json(&message::serialize(&embed, &identity))?)
    }

    pub async fn send(&mut self) -> Result<Res, error::Http> {
        let SendBody { webhook, payload } = self.body().await?;
        let url = webhook::parse_url(&webhook)?;
        let (embed, identity) = message::deserialize(payload)?;
        let request = DispatchRequest {
            url: url.to_string(),
            payload: message::serialize(&embed, &identity),
        };

        let outcome = match webhook::Client::new(&self.config) {
            Ok(client) => request.send(&client).await,
            Err(err) => Outcome::classify(Err(err)),
        };
        if !outcome.is_delivered() {
            console_error!("Dispatch failed : {:?}", outcome);
        }
        Ok(Res::from_json(&outcome.status())?)
    }
}
