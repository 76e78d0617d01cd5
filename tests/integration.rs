//! Request-lifecycle wiring, driven through Rocket's local client.
//!
//! The driver constructs clients without touching the network, so these
//! tests run without a MongoDB server; everything that needs one lives in
//! `tests/live.rs`.

use docket::{Db, Docket, DocumentSpec, Error, MongoConfig, ObjectIdParam};
use rocket::figment::Figment;
use rocket::http::Status;
use rocket::local::asynchronous::Client;
use rocket::{Build, Rocket, get, routes};

static TASK: DocumentSpec = DocumentSpec {
    name: "Task",
    collection: "tasks",
    required_fields: &["title"],
    defaults: None,
};

#[get("/name")]
async fn database_name(db: Db<'_>) -> Result<String, Error> {
    Ok(db.database().await?.name().to_string())
}

#[get("/lazy")]
async fn lazy(db: Db<'_>) -> Result<String, Error> {
    if db.is_connected() {
        return Ok("connected before use".to_string());
    }
    db.ensure_connected().await?;
    if db.is_connected() {
        Ok("connected on first use".to_string())
    } else {
        Ok("still disconnected".to_string())
    }
}

#[get("/ids/<id>")]
fn echo_id(id: Result<ObjectIdParam, Error>) -> Result<String, Error> {
    Ok(id?.to_string())
}

fn app(documents: &Docket, database: &str) -> Rocket<Build> {
    documents.register_one(&TASK);

    let figment = Figment::from(rocket::Config::default())
        .merge((format!("{}.database", MongoConfig::KEY), database));

    rocket::custom(figment)
        .attach(documents.fairing())
        .mount("/", routes![database_name, lazy, echo_id])
}

#[rocket::async_test]
async fn scope_is_lazy_within_a_request() {
    let client = Client::tracked(app(&Docket::new(), "lifecycle"))
        .await
        .unwrap();

    let response = client.get("/lazy").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.into_string().await.unwrap(),
        "connected on first use"
    );
}

#[rocket::async_test]
async fn one_manager_serves_two_applications() {
    let documents = Docket::new();
    let first = Client::tracked(app(&documents, "app_1")).await.unwrap();
    let second = Client::tracked(app(&documents, "app_2")).await.unwrap();

    let one = first.get("/name").dispatch().await;
    let two = second.get("/name").dispatch().await;

    assert_eq!(one.into_string().await.unwrap(), "app_1");
    assert_eq!(two.into_string().await.unwrap(), "app_2");

    // The other application's binding is untouched by the first request.
    let again = first.get("/name").dispatch().await;
    assert_eq!(again.into_string().await.unwrap(), "app_1");
}

#[rocket::async_test]
async fn guard_fails_without_the_fairing() {
    let rocket = rocket::build().mount("/", routes![database_name]);
    let client = Client::tracked(rocket).await.unwrap();

    let response = client.get("/name").dispatch().await;
    assert_eq!(response.status(), Status::InternalServerError);
}

#[rocket::async_test]
async fn valid_ids_round_trip_through_the_route() {
    let client = Client::tracked(app(&Docket::new(), "ids")).await.unwrap();

    let response = client.get("/ids/4e4ac5cfffc84958fa1f45fb").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.into_string().await.unwrap(),
        "4e4ac5cfffc84958fa1f45fb"
    );
}

#[rocket::async_test]
async fn malformed_ids_are_bad_requests() {
    let client = Client::tracked(app(&Docket::new(), "ids")).await.unwrap();

    let response = client.get("/ids/132").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn manager_is_discoverable_from_managed_state() {
    let client = Client::tracked(app(&Docket::new(), "registry"))
        .await
        .unwrap();
    assert!(client.rocket().state::<Docket>().is_some());
}

#[rocket::async_test]
async fn reattaching_with_equal_settings_is_idempotent() {
    let documents = Docket::new();
    let config = MongoConfig {
        database: "same".to_string(),
        ..MongoConfig::default()
    };

    let rocket = rocket::build()
        .attach(documents.fairing_with(config.clone()))
        .attach(documents.fairing_with(config))
        .mount("/", routes![database_name]);

    let client = Client::tracked(rocket).await.unwrap();
    let response = client.get("/name").dispatch().await;
    assert_eq!(response.into_string().await.unwrap(), "same");
}

#[rocket::async_test]
async fn conflicting_rebind_aborts_ignition() {
    let documents = Docket::new();

    let rocket = rocket::build()
        .attach(documents.fairing_with(MongoConfig {
            database: "one".to_string(),
            ..MongoConfig::default()
        }))
        .attach(documents.fairing_with(MongoConfig {
            database: "two".to_string(),
            ..MongoConfig::default()
        }));

    assert!(Client::tracked(rocket).await.is_err());
}
