use crate::{
    api::{audit_log, dashboard, payslips, reports, salary_component, salary_transaction, staff},
    auth::{
        handlers,
        middleware::{admin_only, guest_only, hr_only, signed_in, staff_only},
    },
    theme,
};
use actix_web::{HttpResponse, middleware::from_fn, web};
use serde_json::json;

async fn unauthorized() -> HttpResponse {
    HttpResponse::Forbidden().json(json!({ "error": "You are not authorized to view this page." }))
}

/// Report builder, Excel export and payslip download.
fn report_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            // /reports
            .service(web::resource("").route(web::get().to(reports::report_table)))
            .service(web::resource("/staff").route(web::get().to(reports::staff_options)))
            .service(web::resource("/fetch").route(web::post().to(reports::fetch_reports)))
            .service(web::resource("/export").route(web::get().to(reports::export_reports)))
            // /reports/{row_id}/payslip
            .service(
                web::resource("/{row_id}/payslip")
                    .route(web::get().to(reports::download_payslip)),
            ),
    );
}

fn component_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/staff/{staff_id}/components")
            .route(web::get().to(salary_component::list_components))
            .route(web::post().to(salary_component::create_component)),
    )
    .service(
        web::resource("/staff/{staff_id}/components/{component_id}")
            .route(web::put().to(salary_component::update_component))
            .route(web::delete().to(salary_component::delete_component)),
    );
}

fn generate_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/salaries/generate")
            .route(web::post().to(salary_transaction::generate_salaries)),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    // Public routes
    cfg.route("/unauth", web::get().to(unauthorized))
        .route("/theme", web::get().to(theme::get_theme))
        .route("/theme/toggle", web::post().to(theme::toggle_theme));

    // Guest only
    cfg.service(
        web::resource("/login")
            .wrap(from_fn(guest_only))
            .route(web::post().to(handlers::login)),
    )
    .service(
        web::resource("/register")
            .wrap(from_fn(guest_only))
            .route(web::post().to(handlers::register)),
    )
    .service(
        web::resource("/logout")
            .wrap(from_fn(signed_in))
            .route(web::post().to(handlers::logout)),
    );

    cfg.service(
        web::scope("/adminDashboard")
            .wrap(from_fn(admin_only))
            .route("/dashboard", web::get().to(dashboard::staff_overview))
            // before the /staff scope, which would otherwise swallow these paths
            .configure(component_routes)
            .service(
                web::scope("/staff")
                    // /staff
                    .service(
                        web::resource("")
                            .route(web::get().to(staff::list_staff))
                            .route(web::post().to(staff::create_staff)),
                    )
                    // /staff/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(staff::get_staff))
                            .route(web::put().to(staff::update_staff))
                            .route(web::delete().to(staff::delete_staff)),
                    )
            )
            .configure(generate_routes)
            .configure(report_routes)
            .route("/audit-logs", web::get().to(audit_log::list_audit_logs)),
    );

    cfg.service(
        web::scope("/hrDashboard")
            .wrap(from_fn(hr_only))
            .route("/dashboard", web::get().to(dashboard::staff_overview))
            .route("/profile", web::get().to(dashboard::hr_profile))
            .configure(component_routes)
            .configure(generate_routes)
            .configure(report_routes),
    );

    cfg.service(
        web::scope("/staffDashboard")
            .wrap(from_fn(staff_only))
            .route("/home", web::get().to(dashboard::staff_home))
            .service(
                web::scope("/payslips")
                    .service(web::resource("").route(web::get().to(payslips::payslip_table)))
                    .service(web::resource("/fetch").route(web::post().to(payslips::fetch_payslips)))
                    .service(
                        web::resource("/{row_id}/download")
                            .route(web::get().to(payslips::download_payslip)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::testing::{sign_in, test_state};
    use actix_web::{App, http::StatusCode, test as actix_test};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn location(resp: &actix_web::dev::ServiceResponse) -> String {
        resp.headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[actix_web::test]
    async fn anonymous_requests_go_to_login() {
        let state = test_state("http://127.0.0.1:9");
        let app = actix_test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        for uri in ["/adminDashboard/staff", "/hrDashboard/profile", "/staffDashboard/home"] {
            let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&resp), "/login");
        }
    }

    #[actix_web::test]
    async fn each_scope_admits_one_role() {
        let state = test_state("http://127.0.0.1:9");
        sign_in(&state, 4, Role::Staff);
        let app = actix_test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        for uri in ["/adminDashboard/audit-logs", "/hrDashboard/dashboard"] {
            let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&resp), "/unauth");
        }

        // Guards pass; the empty report set is served without a backend call.
        let resp = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/staffDashboard/payslips").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn signed_in_operators_skip_the_login_page() {
        let state = test_state("http://127.0.0.1:9");
        sign_in(&state, 2, Role::Hr);
        let app = actix_test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let resp = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/login")
                .set_json(serde_json::json!({"username": "x", "password": "y"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), Role::Hr.dashboard_path());
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["redirect"], Role::Hr.dashboard_path());
    }

    #[actix_web::test]
    async fn unauth_page_is_forbidden() {
        let state = test_state("http://127.0.0.1:9");
        let app = actix_test::init_service(App::new().app_data(state).configure(configure)).await;
        let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/unauth").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
