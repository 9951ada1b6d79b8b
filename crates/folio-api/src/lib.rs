//! HTTP surface of the portfolio backend: admin session, SQL console, link
//! report, content CRUD, newsletter and contact form.

pub mod auth;
pub mod blog;
pub mod certs;
pub mod console;
pub mod contact;
pub mod education;
pub mod error;
pub mod experience;
pub mod extract;
pub mod links;
pub mod newsletter;
pub mod projects;
pub mod session;
pub mod state;
pub mod validate;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

pub use state::{AppState, AppStateInner, MailSettings};

/// Every route, with admin-only routes behind `session::require_admin`.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/admin/login", post(auth::login))
        .route("/newsletter/subscribe", post(newsletter::subscribe))
        .route("/newsletter/unsubscribe", delete(newsletter::unsubscribe))
        .route("/contact/send", post(contact::send))
        .route("/education/courses", post(education::list_courses))
        .route("/education/institute", get(education::list_institutes))
        .route("/experience", get(experience::list))
        .route("/cert", get(certs::list))
        .route("/projects", get(projects::page))
        .route("/projects/totalpages", get(projects::total_pages))
        .route("/showcase", get(projects::showcase))
        .route("/blog", get(blog::list))
        .route("/blog/singular", get(blog::single));

    let admin_routes = Router::new()
        .route("/admin/logout", post(auth::logout))
        .route("/admin/sql", post(console::execute_sql))
        .route("/admin/links", get(console::inspect_links))
        .route("/newsletter/getsubs", get(newsletter::subscribers))
        .route(
            "/newsletter/draft",
            post(newsletter::save_draft)
                .get(newsletter::get_draft)
                .delete(newsletter::delete_draft),
        )
        .route("/newsletter/send", post(newsletter::send))
        .route("/education/courses/add", post(education::add_course))
        .route("/education/courses/edit", put(education::edit_course))
        .route("/education/courses/delete", delete(education::delete_course))
        .route("/education/institute/add", post(education::add_institute))
        .route("/education/institute/edit", put(education::edit_institute))
        .route("/education/institute/delete", delete(education::delete_institute))
        .route("/experience/add", post(experience::add))
        .route("/experience/edit", put(experience::edit))
        .route("/experience/delete", delete(experience::remove))
        .route("/cert/add", post(certs::add))
        .route("/cert/edit", put(certs::edit))
        .route("/cert/delete", delete(certs::remove))
        .route("/projects/add", post(projects::add))
        .route("/projects/edit", put(projects::edit))
        .route("/projects/delete", delete(projects::remove))
        .route("/showcase/add", post(projects::add_to_showcase))
        .route("/showcase/remove", delete(projects::remove_from_showcase))
        .route("/blog/add", post(blog::add))
        .route("/blog/edit", put(blog::edit))
        .route("/blog/delete", delete(blog::remove))
        .route_layer(middleware::from_fn_with_state(state.clone(), session::require_admin));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .with_state(state)
}
