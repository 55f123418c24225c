use super::handler;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let token = warp::path("token")
        .and(warp::path::end())
        .and(warp::get())
        .and(with(server.passport_service.clone()))
        .and_then(handler::issue_token);

    let send_code = warp::path("send_code")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.passport_service.clone()))
        .and_then(handler::send_code);

    let compare_code = warp::path("compare_code")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.passport_service.clone()))
        .and_then(handler::compare_code);

    let reset_pwd = warp::path("reset_pwd")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.passport_service.clone()))
        .and_then(handler::reset_pwd);

    let modify_pwd = warp::path("modify_pwd")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.passport_service.clone()))
        .and_then(handler::modify_pwd);

    let trade_pwd = warp::path("trade_pwd")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.passport_service.clone()))
        .and_then(handler::trade_pwd);

    warp::path("passport").and(
        token
            .or(send_code)
            .or(compare_code)
            .or(reset_pwd)
            .or(modify_pwd)
            .or(trade_pwd),
    )
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

#[cfg(test)]
mod tests {
    use super::super::recover_error;
    use super::*;
    use crate::application_impl::*;
    use crate::domain_model::*;
    use crate::domain_port::*;
    use crate::infra_memory::*;
    use serde_json::{Value, json};

    struct Harness {
        server: Arc<Server>,
        registry: Arc<FakeRegistryReader>,
        mutator: Arc<FakePasswordMutator>,
    }

    fn harness() -> Harness {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::at_unix(1_700_000_000));
        let store: Arc<dyn TtlStore> = Arc::new(MemoryTtlStore::new(clock.clone()));
        let identity = Arc::new(FakeIdentityResolver::new().with_member(
            CredentialKind::Phone,
            "user1",
            MemberId(1001),
        ));
        let registry = Arc::new(FakeRegistryReader::new());
        let mutator = Arc::new(FakePasswordMutator::new());
        let service = RealPassportService::new(
            identity,
            Arc::new(FakeMessageDispatcher::new()),
            registry.clone(),
            mutator.clone(),
            store,
            clock,
            PassportConfig::default(),
        );
        Harness {
            server: Arc::new(Server::from_service(Arc::new(service))),
            registry,
            mutator,
        }
    }

    async fn call(server: &Arc<Server>, method: &str, path: &str, body: Option<Value>) -> (u16, Value) {
        let api = routes(server.clone()).recover(recover_error);
        let mut request = warp::test::request().method(method).path(path);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.reply(&api).await;
        let status = response.status().as_u16();
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        (status, body)
    }

    async fn new_token(server: &Arc<Server>) -> String {
        let (status, body) = call(server, "GET", "/passport/token", None).await;
        assert_eq!(status, 200);
        body["data"]["token"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn full_reset_flow_over_http() {
        let h = harness();
        let token = new_token(&h.server).await;

        let (_, body) = call(
            &h.server,
            "POST",
            "/passport/send_code",
            Some(json!({"token": token, "op": 0, "basis": "user1", "type": "2"})),
        )
        .await;
        assert_eq!(body["success"], true);
        assert!(body["error"].is_null());

        let (_, body) = call(
            &h.server,
            "POST",
            "/passport/compare_code",
            Some(json!({"token": token, "basis": "user1", "type": 2, "code": FakeMessageDispatcher::CODE})),
        )
        .await;
        assert_eq!(body["success"], true);

        let (_, body) = call(
            &h.server,
            "POST",
            "/passport/reset_pwd",
            Some(json!({"token": token, "pwd": "n3w", "repwd": "n3w"})),
        )
        .await;
        assert_eq!(body["success"], true);
        assert_eq!(h.mutator.call_count().await, 1);
    }

    #[tokio::test]
    async fn missing_token_reports_invalid_token_code() {
        let h = harness();
        let (status, body) = call(
            &h.server,
            "POST",
            "/passport/send_code",
            Some(json!({"op": "0", "basis": "user1", "type": "2"})),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], 6);
    }

    #[tokio::test]
    async fn second_send_within_interval_fails() {
        let h = harness();
        let token = new_token(&h.server).await;
        let request = json!({"token": token, "op": "0", "basis": "user1", "type": "2"});

        let (_, first) = call(&h.server, "POST", "/passport/send_code", Some(request.clone())).await;
        assert_eq!(first["success"], true);
        let (_, second) = call(&h.server, "POST", "/passport/send_code", Some(request)).await;
        assert_eq!(second["success"], false);
        assert_eq!(second["error"]["code"], 1);
    }

    #[tokio::test]
    async fn debug_mode_echoes_code_as_notice() {
        let h = harness();
        h.registry.set(ENABLE_DEBUG_MODE, "true");
        let token = new_token(&h.server).await;

        let (_, body) = call(
            &h.server,
            "POST",
            "/passport/send_code",
            Some(json!({"token": token, "op": "0", "basis": "user1", "type": "2"})),
        )
        .await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["debug_code"], FakeMessageDispatcher::CODE);
        assert_eq!(body["error"]["code"], 3);
        assert_eq!(
            body["error"]["message"],
            format!("[test] verification code: {}", FakeMessageDispatcher::CODE)
        );
    }

    #[tokio::test]
    async fn password_mismatch_is_rejected_before_mutation() {
        let h = harness();
        let token = new_token(&h.server).await;
        call(
            &h.server,
            "POST",
            "/passport/send_code",
            Some(json!({"token": token, "op": "1", "basis": "user1", "type": "2"})),
        )
        .await;
        call(
            &h.server,
            "POST",
            "/passport/compare_code",
            Some(json!({"token": token, "basis": "user1", "type": "2", "code": FakeMessageDispatcher::CODE})),
        )
        .await;

        let (_, body) = call(
            &h.server,
            "POST",
            "/passport/modify_pwd",
            Some(json!({"token": token, "old_pwd": "old", "pwd": "a", "repwd": "b"})),
        )
        .await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], 2);
        assert_eq!(body["error"]["message"], "the two passwords do not match");
        assert_eq!(h.mutator.call_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let h = harness();
        let (status, body) = call(&h.server, "GET", "/passport/nope", None).await;
        assert_eq!(status, 404);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let h = harness();
        let api = routes(h.server.clone()).recover(recover_error);
        let response = warp::test::request()
            .method("POST")
            .path("/passport/send_code")
            .header("content-type", "application/json")
            .body("{not json")
            .reply(&api)
            .await;
        assert_eq!(response.status().as_u16(), 400);
    }
}
