use std::sync::atomic::{AtomicU64, Ordering};

use actix_cors::Cors;
use actix_web::{
    get, post,
    web::{self, Data, Query},
    HttpResponse, Responder,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Process-wide greeting counter, shared by every worker
#[derive(Default)]
pub struct GreetingCounter {
    last: AtomicU64,
}

impl GreetingCounter {
    fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[derive(Debug, Serialize)]
pub struct Greeting {
    pub id: u64,
    pub content: String,
}

#[derive(Deserialize)]
struct GreetingQuery {
    #[serde(default = "default_name")]
    name: String,
}

fn default_name() -> String {
    "World".to_string()
}

fn greet(counter: &GreetingCounter, name: &str) -> Greeting {
    Greeting {
        id: counter.next(),
        content: format!("Hello, {}!", name),
    }
}

async fn greeting(counter: Data<GreetingCounter>, query: Query<GreetingQuery>) -> impl Responder {
    debug!("Greeting requested for name={}", query.name);
    HttpResponse::Ok().json(greet(&counter, &query.name))
}

#[get("/greeting-javaconfig")]
async fn greeting_javaconfig(
    counter: Data<GreetingCounter>,
    query: Query<GreetingQuery>,
) -> impl Responder {
    HttpResponse::Ok().json(greet(&counter, &query.name))
}

/// Sample upload route; accepts no file
#[post("/mapmonitorjobssample")]
async fn upload_sample(counter: Data<GreetingCounter>, query: Query<GreetingQuery>) -> impl Responder {
    HttpResponse::Ok().json(greet(&counter, &query.name))
}

pub fn greeting_config(config: &mut web::ServiceConfig) {
    config
        .service(
            web::resource("/greeting")
                .wrap(Cors::default().allow_any_origin().allowed_methods(vec!["GET"]))
                .route(web::get().to(greeting)),
        )
        .service(greeting_javaconfig)
        .service(upload_sample);
}
