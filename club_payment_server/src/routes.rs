//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go into
//! a separate module. Keep this module neat and tidy 🙏
//!
//! Any long, non-cpu-bound operation (I/O, database calls) must be expressed as a future so the
//! worker threads keep serving other requests while it is in flight.

use actix_web::{get, HttpResponse, Responder};
use log::*;

// Web-actix cannot handle generics in handlers, so the registration is implemented manually via
// the `route!` macro. Registering a resource with a method guard also gives us the correct `405`
// for non-matching methods on the same path.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                // The guard sits on the route, not the resource, so a request with the wrong
                // method still matches the resource and is answered with 405 rather than 404.
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .route(actix_web::web::route()
                        .guard(actix_web::guard::$method())
                        .to($name::< $( [< T $bounds:camel >], )+>));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}
