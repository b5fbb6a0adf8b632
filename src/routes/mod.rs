pub mod admin;
pub mod auth;
pub mod etudiant;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(auth::auth_routes)
            .configure(admin::admin_routes)
            .configure(etudiant::etudiant_routes),
    );
}
