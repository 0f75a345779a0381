use rocket::{http::Status, routes};

#[rocket::get("/")]
pub async fn healthcheck() -> Status {
    Status::Ok
}

pub fn routes() -> Vec<rocket::Route> {
    routes![healthcheck]
}

#[cfg(test)]
mod tests {
    use crate::test_utils::test_client;
    use rocket::http::Status;

    #[rocket::async_test]
    async fn health_check_works() {
        let client = test_client(Default::default(), Default::default()).await;
        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
    }
}
