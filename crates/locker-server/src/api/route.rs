use actix_web::web;

use super::{health, lock};

/// Register every endpoint on `cfg`
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(lock::lock)
        .service(lock::unlock)
        .service(lock::view_lock)
        .service(lock::list_locks)
        .service(health::health);
}
