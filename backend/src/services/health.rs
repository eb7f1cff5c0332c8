use actix_web::{HttpResponse, Responder};

pub const HEALTH_TEXT: &str = "AIDOShop backend is running.";

/// `GET /`: liveness probe.
pub async fn process() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(HEALTH_TEXT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};

    #[actix_web::test]
    async fn answers_with_fixed_text() {
        let app = test::init_service(App::new().route("/", web::get().to(process))).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert!(resp.status().is_success());
        assert_eq!(test::read_body(resp).await, HEALTH_TEXT.as_bytes());
    }
}
