#[macro_use]
extern crate rocket;

mod api;
mod config;
mod models;
mod services;
mod utils;

use std::path::PathBuf;

use rocket::{Build, Rocket};

use crate::services::credential_store::{bootstrap_token_file, CredentialStore};
use crate::services::metadata_client::{MetadataApi, YouTubeClient};

pub struct AppState {
    pub credentials: CredentialStore,
    pub youtube: Box<dyn MetadataApi>,
}

fn create_app_state() -> AppState {
    let token_path = PathBuf::from(&*config::TOKEN_PATH);
    let (raw, b64) = config::token_seed();
    bootstrap_token_file(&token_path, raw, b64);

    AppState {
        credentials: CredentialStore::new(token_path),
        youtube: Box::new(YouTubeClient::new()),
    }
}

fn mount(rocket: Rocket<Build>, state: AppState) -> Rocket<Build> {
    rocket
        .manage(state)
        .mount("/", routes![api::fetch::home, api::fetch::fetch_metadata])
}

#[launch]
fn rocket() -> _ {
    config::load_environment();
    config::init_logger();

    let figment = rocket::Config::figment()
        .merge(("port", *config::PORT))
        .merge(("address", "0.0.0.0"));

    mount(rocket::custom(figment), create_app_state())
}
