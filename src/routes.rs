use actix_web::web;

use crate::api::{account, employee};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(account::index)))
        .service(
            web::resource("/login")
                .route(web::get().to(account::login_page))
                .route(web::post().to(account::login)),
        )
        .service(
            web::resource("/signup")
                .route(web::get().to(account::signup_page))
                .route(web::post().to(account::signup)),
        )
        .service(
            web::resource("/forgot")
                .route(web::get().to(account::forgot_page))
                .route(web::post().to(account::forgot)),
        )
        .service(
            web::resource("/reset/{token}")
                .route(web::get().to(account::reset_form))
                .route(web::post().to(account::reset)),
        )
        .service(
            web::resource("/password/change")
                .route(web::get().to(account::change_password_page))
                .route(web::post().to(account::change_password)),
        )
        .service(web::resource("/logout").route(web::get().to(account::logout)))
        .service(web::resource("/dashboard").route(web::get().to(employee::dashboard)))
        .service(
            web::resource("/employee/new")
                .route(web::get().to(employee::new_employee_page))
                .route(web::post().to(employee::create_employee)),
        )
        .service(web::resource("/employee/search").route(web::get().to(employee::search_page)))
        .service(web::resource("/employee").route(web::get().to(employee::search)))
        // plain HTML forms can only speak GET/POST, so the edit and delete
        // forms post to the same handlers the PUT/DELETE routes expose
        .service(
            web::resource("/edit/{id}")
                .route(web::get().to(employee::edit_page))
                .route(web::post().to(employee::update_employee))
                .route(web::put().to(employee::update_employee)),
        )
        .service(
            web::resource("/delete/{id}")
                .route(web::post().to(employee::delete_employee))
                .route(web::delete().to(employee::delete_employee)),
        )
        .service(web::resource("/deleteAll").route(web::get().to(employee::delete_all)));
}

#[cfg(test)]
mod tests {
    use actix_http::Request;
    use actix_web::cookie::Cookie;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, Error, test, web};
    use chrono::{Duration, Utc};

    use crate::auth::session::SESSION_COOKIE;
    use crate::state::AppState;
    use crate::store::{EmployeeStore, MemStore, UserStore};
    use crate::testutil;

    async fn spawn(
        state: AppState,
    ) -> impl Service<Request, Response = ServiceResponse, Error = Error> {
        test::init_service(
            App::new()
                .app_data(web::Data::new(testutil::test_config()))
                .app_data(web::Data::new(state))
                .configure(super::configure),
        )
        .await
    }

    fn location(resp: &ServiceResponse) -> &str {
        resp.headers()
            .get(header::LOCATION)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("")
    }

    fn session_cookie(resp: &ServiceResponse) -> Cookie<'static> {
        resp.response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .expect("session cookie missing")
            .into_owned()
    }

    async fn signup_and_login<S>(app: &S, name: &str, email: &str, password: &str) -> Cookie<'static>
    where
        S: Service<Request, Response = ServiceResponse, Error = Error>,
    {
        let resp = test::call_service(
            app,
            test::TestRequest::post()
                .uri("/signup")
                .set_form([("name", name), ("email", email), ("password", password)])
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/login");

        let resp = test::call_service(
            app,
            test::TestRequest::post()
                .uri("/login")
                .set_form([("email", email), ("password", password)])
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/dashboard");
        session_cookie(&resp)
    }

    #[actix_web::test]
    async fn signup_then_login_reaches_dashboard() {
        let (state, _, _) = testutil::test_state();
        let app = spawn(state).await;

        let session = signup_and_login(&app, "A", "a@x.com", "p1").await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/dashboard")
                .cookie(session)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("Dashboard"));
    }

    #[actix_web::test]
    async fn wrong_password_bounces_back_to_login() {
        let (state, _, _) = testutil::test_state();
        let app = spawn(state).await;
        signup_and_login(&app, "A", "a@x.com", "p1").await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_form([("email", "a@x.com"), ("password", "wrong")])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/login");
    }

    #[actix_web::test]
    async fn protected_routes_redirect_anonymous_users() {
        let (state, _, _) = testutil::test_state();
        let app = spawn(state).await;

        for uri in ["/dashboard", "/employee/new", "/deleteAll"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::SEE_OTHER, "GET {uri}");
            assert_eq!(location(&resp), "/login", "GET {uri}");
        }

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/employee/new")
                .set_form([("name", "X"), ("designation", "Y"), ("salary", "1")])
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/login");
    }

    #[actix_web::test]
    async fn employee_crud_round_trip() {
        let (state, store, _) = testutil::test_state();
        let app = spawn(state).await;
        let session = signup_and_login(&app, "A", "a@x.com", "p1").await;

        // create
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/employee/new")
                .cookie(session.clone())
                .set_form([("name", "Ann"), ("designation", "Engineer"), ("salary", "1000")])
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/dashboard");

        let employees = store.list_employees().await.unwrap();
        assert_eq!(employees.len(), 1);
        let id = employees[0].id;

        // dashboard shows it
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/dashboard")
                .cookie(session.clone())
                .to_request(),
        )
        .await;
        let body = String::from_utf8_lossy(&test::read_body(resp).await).to_string();
        assert!(body.contains("Ann"));

        // search by name
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/employee?name=Ann")
                .cookie(session.clone())
                .to_request(),
        )
        .await;
        let body = String::from_utf8_lossy(&test::read_body(resp).await).to_string();
        assert!(body.contains("Engineer"));

        // update
        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/edit/{id}"))
                .cookie(session.clone())
                .set_form([("name", "Anna"), ("designation", "Lead"), ("salary", "1500")])
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/dashboard");
        let updated = store.find_employee(id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Anna");
        assert_eq!(updated.salary, 1500.0);

        // delete, then delete again (idempotent no-op)
        for _ in 0..2 {
            let resp = test::call_service(
                &app,
                test::TestRequest::delete()
                    .uri(&format!("/delete/{id}"))
                    .cookie(session.clone())
                    .to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&resp), "/dashboard");
        }
        assert!(store.list_employees().await.unwrap().is_empty());
    }

    /// Pulls the action out of the first `<form method="post">` whose
    /// action starts with `path_prefix`, the way a browser would submit it.
    fn form_action(markup: &str, path_prefix: &str) -> String {
        let marker = format!("<form method=\"post\" action=\"{path_prefix}");
        let start = markup.find(&marker).expect("form not rendered");
        let rest = &markup[start + "<form method=\"post\" action=\"".len()..];
        rest[..rest.find('"').expect("unterminated action")].to_string()
    }

    async fn create_employee<S>(app: &S, store: &MemStore, session: &Cookie<'static>) -> uuid::Uuid
    where
        S: Service<Request, Response = ServiceResponse, Error = Error>,
    {
        let resp = test::call_service(
            app,
            test::TestRequest::post()
                .uri("/employee/new")
                .cookie(session.clone())
                .set_form([("name", "Ann"), ("designation", "Engineer"), ("salary", "1000")])
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/dashboard");

        let employees = store.list_employees().await.unwrap();
        employees.last().expect("employee not created").id
    }

    #[actix_web::test]
    async fn edit_form_submits_the_way_it_is_rendered() {
        let (state, store, _) = testutil::test_state();
        let app = spawn(state).await;
        let session = signup_and_login(&app, "A", "a@x.com", "p1").await;
        let id = create_employee(&app, &store, &session).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/edit/{id}"))
                .cookie(session.clone())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = String::from_utf8_lossy(&test::read_body(resp).await).to_string();

        // submit to the exact action the page declares, as a POST
        let action = form_action(&body, "/edit/");
        assert_eq!(action, format!("/edit/{id}"));

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&action)
                .cookie(session)
                .set_form([("name", "Anna"), ("designation", "Lead"), ("salary", "1500")])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/dashboard");

        let updated = store.find_employee(id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Anna");
        assert_eq!(updated.salary, 1500.0);
    }

    #[actix_web::test]
    async fn dashboard_delete_button_removes_the_row() {
        let (state, store, _) = testutil::test_state();
        let app = spawn(state).await;
        let session = signup_and_login(&app, "A", "a@x.com", "p1").await;
        let id = create_employee(&app, &store, &session).await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/dashboard")
                .cookie(session.clone())
                .to_request(),
        )
        .await;
        let body = String::from_utf8_lossy(&test::read_body(resp).await).to_string();

        let action = form_action(&body, "/delete/");
        assert_eq!(action, format!("/delete/{id}"));

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&action)
                .cookie(session)
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/dashboard");
        assert!(store.list_employees().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn invalid_employee_form_rerenders_page() {
        let (state, store, _) = testutil::test_state();
        let app = spawn(state).await;
        let session = signup_and_login(&app, "A", "a@x.com", "p1").await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/employee/new")
                .cookie(session)
                .set_form([("name", ""), ("designation", "Engineer"), ("salary", "abc")])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = String::from_utf8_lossy(&test::read_body(resp).await).to_string();
        assert!(body.contains("flash-error"));
        assert!(store.list_employees().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn delete_all_empties_the_collection() {
        let (state, store, _) = testutil::test_state();
        let app = spawn(state).await;
        let session = signup_and_login(&app, "A", "a@x.com", "p1").await;

        for (name, designation) in [("Ann", "Engineer"), ("Bob", "Manager")] {
            let resp = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/employee/new")
                    .cookie(session.clone())
                    .set_form([("name", name), ("designation", designation), ("salary", "1")])
                    .to_request(),
            )
            .await;
            assert_eq!(location(&resp), "/dashboard");
        }

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/deleteAll")
                .cookie(session)
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/dashboard");
        assert!(store.list_employees().await.unwrap().is_empty());
    }

    async fn issued_token(store: &MemStore, email: &str) -> String {
        store
            .find_user_by_email(email)
            .await
            .unwrap()
            .unwrap()
            .reset_token
            .expect("no reset token issued")
    }

    #[actix_web::test]
    async fn forgot_and_reset_flow_end_to_end() {
        let (state, store, mailer) = testutil::test_state();
        let app = spawn(state).await;
        signup_and_login(&app, "A", "a@x.com", "old-pass").await;

        // unknown email issues nothing
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/forgot")
                .set_form([("email", "nobody@x.com")])
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/forgot");
        assert!(mailer.sent().is_empty());

        // known email sends the recovery link
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/forgot")
                .set_form([("email", "a@x.com")])
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/forgot");

        let token = issued_token(&store, "a@x.com").await;
        assert!(mailer.sent()[0].body.contains(&format!("/reset/{token}")));

        // the confirmation form renders while the token is live
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/reset/{token}"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        // mismatched passwords abort without consuming the token
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/reset/{token}"))
                .set_form([("password", "new-pass"), ("confirmpassword", "nope")])
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/forgot");
        assert_eq!(issued_token(&store, "a@x.com").await, token);

        // matching passwords rotate the credential
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/reset/{token}"))
                .set_form([("password", "new-pass"), ("confirmpassword", "new-pass")])
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/login");

        // old password no longer works, the new one does
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_form([("email", "a@x.com"), ("password", "old-pass")])
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/login");

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_form([("email", "a@x.com"), ("password", "new-pass")])
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/dashboard");
    }

    #[actix_web::test]
    async fn expired_token_redirects_to_forgot() {
        let (state, store, _) = testutil::test_state();
        let app = spawn(state).await;
        signup_and_login(&app, "A", "a@x.com", "p1").await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/forgot")
                .set_form([("email", "a@x.com")])
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/forgot");
        let token = issued_token(&store, "a@x.com").await;

        // push expiry into the past; the stale pair stays until overwritten
        let mut user = store.find_user_by_email("a@x.com").await.unwrap().unwrap();
        user.reset_expires = Some(Utc::now() - Duration::minutes(1));
        store.save_user(&user).await.unwrap();

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/reset/{token}"))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/forgot");
    }

    #[actix_web::test]
    async fn change_password_requires_matching_confirmation() {
        let (state, store, _) = testutil::test_state();
        let app = spawn(state).await;
        let session = signup_and_login(&app, "A", "a@x.com", "p1").await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/password/change")
                .cookie(session.clone())
                .set_form([("password", "p2"), ("confirmpassword", "other")])
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/password/change");

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/password/change")
                .cookie(session)
                .set_form([("password", "p2"), ("confirmpassword", "p2")])
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/dashboard");

        let user = store.find_user_by_email("a@x.com").await.unwrap().unwrap();
        assert!(crate::auth::password::verify_password("p2", &user.password_hash));
    }

    #[actix_web::test]
    async fn logout_clears_the_session() {
        let (state, _, _) = testutil::test_state();
        let app = spawn(state).await;
        let session = signup_and_login(&app, "A", "a@x.com", "p1").await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/logout")
                .cookie(session)
                .to_request(),
        )
        .await;
        assert_eq!(location(&resp), "/login");

        let cleared = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .expect("no removal cookie");
        assert!(cleared.value().is_empty());
    }

    #[actix_web::test]
    async fn root_redirects_to_login() {
        let (state, _, _) = testutil::test_state();
        let app = spawn(state).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/login");
    }
}
