mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, HttpMessage, HttpResponse};
use backend_test_support::problem_details::assert_problem_details_from_service_response;
use db_infra::ServiceKey;
use shopfront::infra::state::build_state;
use shopfront::test_support::{create_test_app_builder, detached_manager, registry_with};
use shopfront::{AnalyticsDb, AppError, OrdersDb, ServiceLookup, UsersDb};

#[actix_web::test]
async fn each_service_route_returns_its_manager() {
    let state = build_state()
        .with_registry(registry_with(&ServiceKey::ALL))
        .build()
        .await
        .unwrap();
    let app = create_test_app_builder(state).build().await;

    for service in ServiceKey::ALL {
        let req = test::TestRequest::get()
            .uri(&format!("/api/{service}/db"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body = common::read_json(resp).await;

        assert_eq!(body["service"], service.as_str());
        assert_eq!(body["schema"], service.default_schema());
        assert!(body["backend"].is_null());
    }
}

#[actix_web::test]
async fn missing_manager_renders_service_unavailable() {
    let cases = [
        (ServiceKey::Users, "Users database not initialized"),
        (ServiceKey::Orders, "Orders database not initialized"),
        (ServiceKey::Analytics, "Analytics database not initialized"),
    ];

    let state = build_state().build().await.unwrap();
    let app = create_test_app_builder(state).build().await;

    for (service, detail) in cases {
        let req = test::TestRequest::get()
            .uri(&format!("/api/{service}/db"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_problem_details_from_service_response(
            resp,
            "SERVICE_UNAVAILABLE",
            StatusCode::INTERNAL_SERVER_ERROR,
            Some(detail),
        )
        .await;
    }
}

#[actix_web::test]
async fn handler_receives_the_registered_instance() {
    let users = detached_manager(ServiceKey::Users);
    let expected = users.clone();
    let state = build_state().with_manager(users).build().await.unwrap();

    let app = create_test_app_builder(state)
        .with_routes(move |cfg| {
            cfg.route(
                "/same",
                web::get().to(move |db: UsersDb| {
                    let expected = expected.clone();
                    async move {
                        let same = db.same_instance(&expected);
                        Ok::<_, AppError>(HttpResponse::Ok().json(same))
                    }
                }),
            );
        })
        .build()
        .await;

    let req = test::TestRequest::get().uri("/same").to_request();
    let resp = test::call_service(&app, req).await;
    let body = common::read_json(resp).await;
    assert_eq!(body, true);
}

#[actix_web::test]
async fn users_only_registry_scenario() {
    let state = build_state()
        .with_manager(detached_manager(ServiceKey::Users))
        .build()
        .await
        .unwrap();
    let app = create_test_app_builder(state).build().await;

    let req = test::TestRequest::get().uri("/api/users/db").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/orders/db").to_request();
    let resp = test::call_service(&app, req).await;
    let problem = assert_problem_details_from_service_response(
        resp,
        "SERVICE_UNAVAILABLE",
        StatusCode::INTERNAL_SERVER_ERROR,
        None,
    )
    .await;
    assert_eq!(problem.detail, "Orders database not initialized");
    assert_ne!(problem.trace_id, "unknown");
}

#[actix_web::test]
async fn repeated_requests_see_the_same_manager() {
    let orders = detached_manager(ServiceKey::Orders);
    let expected = orders.clone();
    let state = build_state().with_manager(orders).build().await.unwrap();

    let app = create_test_app_builder(state)
        .with_routes(move |cfg| {
            cfg.route(
                "/orders",
                web::get().to(move |first: OrdersDb, second: OrdersDb| {
                    let expected = expected.clone();
                    async move {
                        let same = first.same_instance(&second) && first.same_instance(&expected);
                        Ok::<_, AppError>(HttpResponse::Ok().json(same))
                    }
                }),
            );
        })
        .build()
        .await;

    for _ in 0..2 {
        let req = test::TestRequest::get().uri("/orders").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(common::read_json(resp).await, true);
    }
}

#[actix_web::test]
async fn handler_is_not_invoked_when_manager_missing() {
    let state = build_state().build().await.unwrap();
    let app = create_test_app_builder(state)
        .with_routes(|cfg| {
            cfg.route(
                "/analytics",
                web::get().to(|_db: AnalyticsDb| async {
                    // Reaching the handler would surface INTERNAL instead.
                    Err::<HttpResponse, _>(AppError::internal("handler ran without a manager"))
                }),
            );
        })
        .build()
        .await;

    let req = test::TestRequest::get().uri("/analytics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_from_service_response(
        resp,
        "SERVICE_UNAVAILABLE",
        StatusCode::INTERNAL_SERVER_ERROR,
        Some("Analytics"),
    )
    .await;
}

#[actix_web::test]
async fn completed_requests_carry_the_service_lookup() {
    let state = build_state()
        .with_manager(detached_manager(ServiceKey::Users))
        .build()
        .await
        .unwrap();
    let app = create_test_app_builder(state).build().await;

    let cases = [
        ("/api/users/db", ServiceKey::Users, true),
        ("/api/orders/db", ServiceKey::Orders, false),
        ("/api/databases/analytics", ServiceKey::Analytics, false),
    ];
    for (uri, service, found) in cases {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        let lookup = resp.request().extensions().get::<ServiceLookup>().copied();
        assert_eq!(lookup, Some(ServiceLookup { service, found }), "{uri}");
    }

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.request().extensions().get::<ServiceLookup>().is_none());
}
