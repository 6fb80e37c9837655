//! Authentication routes under `/api/v1/auth`

pub mod login;
pub mod logout;
pub mod me;
pub mod otp;
pub mod refresh;
pub mod register;

use actix_web::{dev::HttpServiceFactory, web};

use crate::middleware::JwtAuth;

pub use login::login;
pub use logout::{logout, logout_all};
pub use me::me;
pub use otp::{request_otp, resend_otp, verify_otp};
pub use refresh::refresh_token;
pub use register::register;

pub(crate) fn scope() -> impl HttpServiceFactory {
    web::scope("/auth")
        .route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/otp/request", web::post().to(request_otp))
        .route("/otp/verify", web::post().to(verify_otp))
        .route("/otp/resend", web::post().to(resend_otp))
        .route("/refresh-token", web::post().to(refresh_token))
        .service(
            web::resource("/logout")
                .wrap(JwtAuth)
                .route(web::post().to(logout)),
        )
        .service(
            web::resource("/logout-all")
                .wrap(JwtAuth)
                .route(web::post().to(logout_all)),
        )
        .service(web::resource("/me").wrap(JwtAuth).route(web::get().to(me)))
}
