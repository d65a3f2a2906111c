//! Router Integration Tests
//!
//! Drives the full router (auth, handlers, services) against the in-memory
//! adapters with `tower::ServiceExt::oneshot`.
//!
//! # Test Organization
//!
//! - `health_tests` - public liveness and readiness
//! - `auth_tests` - bearer and cookie sessions
//! - `premium_tests` - quote document and failure mapping
//! - `detail_tests` - coverage and medical detail storage
//! - `intake_tests` - base coverage, definitions, owners and beneficiaries
//! - `code_tests` - dropdown lists

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use core_kernel::UserRole;
use domain_application::ports::mock::{MockCodeLookup, MockDetailStore, MockIntakeStore, SequentialIds};
use domain_application::{ApplicationEnvelope, CoverageDefinition};
use interface_api::{auth::create_token, config::ApiConfig, create_router, AppState};
use test_utils::{assert_document_amount, ApplicationFixtures, CodeFixtures};

const SECRET: &str = "integration-secret";

fn config() -> ApiConfig {
    ApiConfig {
        jwt_secret: SECRET.to_string(),
        ..ApiConfig::default()
    }
}

fn codes() -> MockCodeLookup {
    MockCodeLookup::new()
        .with_codes("frcodeCountry", CodeFixtures::countries())
        .with_codes("frcodeState", CodeFixtures::states())
        .with_codes("frcodeProvince", CodeFixtures::provinces())
}

fn intake() -> MockIntakeStore {
    MockIntakeStore::new()
        .with_application_form("A-100", "FORM-1")
        .with_coverage_definition("PLAN-1", CoverageDefinition::new("DEF-BASE", "Base coverage"))
        .with_coverage_definition("PLAN-1", CoverageDefinition::new("DEF-WP", "Waiver of premium"))
        .with_role_client("OWNER-ROLE", "CLIENT-1")
}

fn build_app(store: Arc<MockDetailStore>, intake_store: Arc<MockIntakeStore>) -> Router {
    create_router(AppState::new(
        config(),
        store,
        intake_store,
        Arc::new(codes()),
        Arc::new(SequentialIds::new("id")),
    ))
}

fn app_with(store: Arc<MockDetailStore>) -> Router {
    build_app(store, Arc::new(intake()))
}

fn app() -> Router {
    app_with(Arc::new(MockDetailStore::new()))
}

fn token() -> String {
    create_token("agent7", UserRole::Agent, SECRET, 300).unwrap()
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    request_as(&token(), method, uri, body)
}

fn request_as(token: &str, method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness_is_public() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_reports_each_adapter() {
        let request = Request::get("/health/ready").body(Body::empty()).unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_readiness_fails_when_store_is_down() {
        let store = Arc::new(MockDetailStore::new());
        store.set_unavailable(true);

        let request = Request::get("/health/ready").body(Body::empty()).unwrap();
        let (status, body) = send(app_with(store), request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");
    }

    #[tokio::test]
    async fn test_request_id_is_returned() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let request = Request::get("/api/v1/codes/dropdowns").body(Body::empty()).unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_forged_token_is_unauthorized() {
        let forged = create_token("agent7", UserRole::Admin, "wrong-secret", 300).unwrap();
        let request = Request::get("/api/v1/codes/dropdowns")
            .header(header::AUTHORIZATION, format!("Bearer {}", forged))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_cookie_is_accepted() {
        let request = Request::get("/api/v1/codes/dropdowns")
            .header(header::COOKIE, format!("jwt={}", token()))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
    }
}

mod premium_tests {
    use super::*;

    fn application() -> Value {
        json!({
            "application": {
                "ApplicationFormGUID": "APP-1",
                "PlanGUID": "PLAN-1",
                "coverages": [{
                    "CoverageGUID": "COV-1",
                    "CoverageDefinitionGUID": "BASE-TERM-20",
                    "coveragedetails": { "FaceAmount": "100000", "UWClass": "01" },
                    "roles": [{ "RoleCode": "INSURED", "client": { "Tobacco": "Non-Smoker" } }]
                }]
            }
        })
    }

    #[tokio::test]
    async fn test_quote_document() {
        let request = request(Method::POST, "/api/v1/coverage/premium/calculate", Some(application()));
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "COV-1_premium": 50.0,
                "APP-1_totalAnnualPremium": 50.0,
                "APP-1_totalMonthlyPremium": 4.45,
                "APP-1_totalQuarterlyPremium": 13.59,
                "APP-1_totalSemiAnnualPremium": 26.04
            })
        );
    }

    #[tokio::test]
    async fn test_rider_on_smoker() {
        let envelope = ApplicationEnvelope {
            application: ApplicationFixtures::base_and_rider_smoker(),
        };
        let body = serde_json::to_value(envelope).unwrap();

        let request = request(Method::POST, "/api/v1/coverage/premium/calculate", Some(body));
        let (status, document) = send(app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_document_amount(&document, "COV-BASE_premium", 50.0);
        assert_document_amount(&document, "COV-RIDER_premium", 45.0);
        assert_document_amount(&document, "APP-2_totalAnnualPremium", 95.0);
        assert_document_amount(&document, "APP-2_totalMonthlyPremium", 8.46);
    }

    #[tokio::test]
    async fn test_missing_coverage_id_is_bad_request() {
        let mut body = application();
        body["application"]["coverages"][0]
            .as_object_mut()
            .unwrap()
            .remove("CoverageGUID");

        let request = request(Method::POST, "/api/v1/coverage/premium/calculate", Some(body));
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Failed to calculate premium:"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let request = Request::post("/api/v1/coverage/premium/calculate")
            .header(header::AUTHORIZATION, format!("Bearer {}", token()))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"application\": "))
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }
}

mod detail_tests {
    use super::*;

    #[tokio::test]
    async fn test_coverage_details_insert_then_update() {
        let store = Arc::new(MockDetailStore::new());
        let form = json!({ "faceAmount": "500000", "underwritingClass": "Preferred" });

        let (status, body) = send(
            app_with(store.clone()),
            request(Method::PUT, "/api/v1/coverage/COV-9/details", Some(form.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "inserted": 2, "updated": 0, "removed": 0 }));

        let (_, body) = send(
            app_with(store.clone()),
            request(Method::PUT, "/api/v1/coverage/COV-9/details", Some(form)),
        )
        .await;
        assert_eq!(body, json!({ "inserted": 0, "updated": 2, "removed": 0 }));

        let (status, body) = send(
            app_with(store),
            request(Method::GET, "/api/v1/coverage/COV-9/details", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["faceAmount"], "500000");
    }

    #[tokio::test]
    async fn test_cleared_table_rating_is_gone_after_save() {
        let store = Arc::new(MockDetailStore::new());
        let rated = json!({ "faceAmount": "100000", "tableRating": "150%" });
        send(
            app_with(store.clone()),
            request(Method::PUT, "/api/v1/coverage/COV-9/details", Some(rated)),
        )
        .await;

        let cleared = json!({ "faceAmount": "200000", "tableRating": "" });
        let (status, body) = send(
            app_with(store.clone()),
            request(Method::PUT, "/api/v1/coverage/COV-9/details", Some(cleared)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "inserted": 0, "updated": 1, "removed": 1 }));

        let (_, body) = send(
            app_with(store),
            request(Method::GET, "/api/v1/coverage/COV-9/details", None),
        )
        .await;
        assert_eq!(body["faceAmount"], "200000");
        assert_eq!(body["tableRating"], Value::Null);
    }

    #[tokio::test]
    async fn test_unknown_coverage_is_not_found() {
        let (status, body) = send(app(), request(Method::GET, "/api/v1/coverage/NOPE/details", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_invalid_form_is_unprocessable() {
        let form = json!({ "faceAmount": "a lot" });
        let (status, _) = send(app(), request(Method::PUT, "/api/v1/coverage/COV-9/details", Some(form))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_store_outage_is_service_unavailable() {
        let store = Arc::new(MockDetailStore::new());
        store.set_unavailable(true);
        let form = json!({ "faceAmount": "1000" });

        let (status, _) = send(
            app_with(store),
            request(Method::PUT, "/api/v1/coverage/COV-9/details", Some(form)),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_medical_answers_round_trip() {
        let store = Arc::new(MockDetailStore::new());
        let answers = json!({ "HeartCondition": "N", "HeightCm": 180, "Notes": null });

        let (status, body) = send(
            app_with(store.clone()),
            request(Method::PUT, "/api/v1/roles/ROLE-1/medical", Some(answers)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "roleId": "ROLE-1", "stored": 2 }));

        let (_, body) = send(app_with(store), request(Method::GET, "/api/v1/roles/ROLE-1/medical", None)).await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.contains(&json!({
            "fieldName": "HeartCondition",
            "value": { "kind": "text", "value": "02" }
        })));
    }
}

mod intake_tests {
    use super::*;

    fn owners_form() -> Value {
        json!({
            "applicationFormNumber": "A-300",
            "owners": [{
                "planGUID": "PLAN-1",
                "typeCode": "01",
                "firstName": "Jane",
                "lastName": "Doe",
                "dateOfBirth": "1980-01-15",
                "addresses": [{ "typeCode": "01", "addressLine1": "1 King St", "city": "Toronto" }]
            }]
        })
    }

    #[tokio::test]
    async fn test_base_coverage_created() {
        let intake_store = Arc::new(intake());
        let app = build_app(Arc::new(MockDetailStore::new()), intake_store.clone());
        let form = json!({
            "planGUID": "PLAN-1",
            "coverageType": "single",
            "insured1": "OWNER-ROLE",
            "insured1IsSameAsOwner": true,
            "faceAmount": "250000",
            "tableRating": "125%",
            "underwritingClass": "Standard Plus"
        });

        let (status, body) = send(app, request(Method::POST, "/api/v1/coverage/base/A-100", Some(form))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coverageGUID"], "id-1");
        assert_eq!(body["coverageDefinitionGUID"], "DEF-BASE");
        assert_eq!(body["applicationFormGUID"], "FORM-1");
        assert_eq!(body["planGUID"], "PLAN-1");
        assert_eq!(body["insuredRoles"], json!([{ "insuredId": "OWNER-ROLE", "roleGUID": "id-2" }]));
        assert_eq!(intake_store.snapshot().await.coverages[0].details.len(), 3);
    }

    #[tokio::test]
    async fn test_base_coverage_for_unknown_application() {
        let form = json!({ "planGUID": "PLAN-1", "faceAmount": "1000" });
        let (status, body) = send(app(), request(Method::POST, "/api/v1/coverage/base/A-404", Some(form))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_base_coverage_without_plan_is_unprocessable() {
        let form = json!({ "faceAmount": "1000" });
        let (status, _) = send(app(), request(Method::POST, "/api/v1/coverage/base/A-100", Some(form))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_additional_definitions() {
        let (status, body) = send(
            app(),
            request(Method::GET, "/api/v1/coverage/additional-definitions/PLAN-1", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{ "coverageDefinitionGUID": "DEF-WP", "coverageName": "Waiver of premium" }])
        );
    }

    #[tokio::test]
    async fn test_agent_saving_owners_becomes_agent_of_record() {
        let intake_store = Arc::new(intake());
        let app = build_app(Arc::new(MockDetailStore::new()), intake_store.clone());

        let (status, body) = send(app, request(Method::POST, "/api/v1/owners", Some(owners_form()))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["owners"][0]["roleCode"], "01");
        assert_eq!(body["owners"][0]["addressGUIDs"].as_array().unwrap().len(), 1);
        assert!(body["agentRoleGUID"].is_string());
        let tables = intake_store.snapshot().await;
        assert_eq!(tables.agent_roles.len(), 1);
        assert!(tables.application_forms.contains_key("A-300"));
    }

    #[tokio::test]
    async fn test_admin_saving_owners_is_not_agent_of_record() {
        let intake_store = Arc::new(intake());
        let app = build_app(Arc::new(MockDetailStore::new()), intake_store.clone());
        let admin = create_token("root", UserRole::Admin, SECRET, 300).unwrap();

        let (status, body) = send(
            app,
            request_as(&admin, Method::POST, "/api/v1/owners", Some(owners_form())),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.get("agentRoleGUID").is_none());
        assert!(intake_store.snapshot().await.agent_roles.is_empty());
    }

    #[tokio::test]
    async fn test_beneficiary_allocations_stored_as_role_details() {
        let store = Arc::new(MockDetailStore::new());
        let form = json!({
            "applicationFormNumber": "A-100",
            "beneficiaryAllocations": [{
                "roleGUID": "BEN-1",
                "coverageId": "COV-1",
                "type": "primary",
                "relationshipToInsured": "Spouse",
                "allocation": "100"
            }]
        });

        let (status, body) = send(
            app_with(store.clone()),
            request(Method::POST, "/api/v1/beneficiaries/allocations", Some(form)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "saved": 1 }));

        let (_, body) = send(app_with(store), request(Method::GET, "/api/v1/roles/BEN-1/medical", None)).await;
        assert!(body.as_array().unwrap().contains(&json!({
            "fieldName": "Relationship to Insured",
            "value": { "kind": "text", "value": "Spouse" }
        })));
    }
}

mod code_tests {
    use super::*;

    #[tokio::test]
    async fn test_dropdowns() {
        let (status, body) = send(app(), request(Method::GET, "/api/v1/codes/dropdowns", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["countries"].as_array().unwrap().len(), 2);
        assert_eq!(body["countries"][0]["code"], "US");
        assert_eq!(body["provinces"][0]["description"], "Ontario");
    }
}
