//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation (e.g. I/O,
//! database operations, etc.) should be expressed as futures or asynchronous functions. Async handlers get executed
//! concurrently by worker threads and thus don't block execution.

use actix_web::{get, web, HttpResponse, Responder};
use checkout_engine::{
    db_types::OrderId,
    CheckoutApi,
    CheckoutRequest,
    OrderStore,
    PaymentGatewayClient,
};
use log::*;
use serde_json::Value;

use crate::{
    data_objects::{
        NotificationAck,
        OrderAuditResponse,
        OrderListQuery,
        OrderListResponse,
        OrderResponse,
        StatusQuery,
        StatusResponse,
        TransactionResponse,
    },
    errors::ServerError,
};

// Actix cannot handle generics in handlers, so each route is registered manually using the `route!` macro
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
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
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

//--------------------------------------------  Transactions  --------------------------------------------------
route!(create_transaction => Post "/transactions" impl OrderStore, PaymentGatewayClient);
/// Route handler for the transaction creation endpoint.
///
/// Creates a new order from the checkout request and opens a payment session for it on the gateway. The order
/// record is written before the gateway is contacted, so a gateway failure (502) still leaves a pending order
/// behind for later reconciliation.
pub async fn create_transaction<B, G>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore,
    G: PaymentGatewayClient,
{
    trace!("💻️ Received create transaction request");
    let outcome = api.create_checkout(body.into_inner()).await?;
    info!("💻️ Created transaction for order {}", outcome.order_id);
    Ok(HttpResponse::Ok().json(TransactionResponse::from(outcome)))
}

route!(payment_status => Get "/{order_id}/status" impl OrderStore, PaymentGatewayClient);
/// Route handler for payment status queries.
///
/// Serves the stored status when it is fresh, otherwise polls the gateway and reconciles any transition it
/// observes. Pass `?forceCheck=true` to bypass the cache.
pub async fn payment_status<B, G>(
    path: web::Path<String>,
    query: web::Query<StatusQuery>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore,
    G: PaymentGatewayClient,
{
    let order_id = OrderId(path.into_inner());
    let force_check = query.force_check.unwrap_or(false);
    debug!("💻️ GET status for order {order_id} (force_check: {force_check})");
    let result = api.check_status(&order_id, force_check).await?;
    Ok(HttpResponse::Ok().json(StatusResponse::from(result)))
}

//--------------------------------------------  Notifications  -------------------------------------------------
route!(payment_notification => Post "/notifications" impl OrderStore, PaymentGatewayClient);
/// Route handler for gateway webhook notifications.
///
/// The payload is verified before anything is written; a notification that fails verification gets a 403 and a
/// malformed one gets a 400, so the gateway will retry neither. Redelivered notifications are acknowledged with
/// `applied: false`.
pub async fn payment_notification<B, G>(
    body: web::Json<Value>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore,
    G: PaymentGatewayClient,
{
    trace!("💻️ Received payment notification");
    let outcome = api.handle_notification(body.into_inner()).await?;
    info!("💻️ Notification for order {} processed (applied: {})", outcome.order_id, outcome.applied);
    Ok(HttpResponse::Ok().json(NotificationAck::from(outcome)))
}

//-----------------------------------------------  Orders  -----------------------------------------------------
route!(orders => Get "" impl OrderStore, PaymentGatewayClient);
pub async fn orders<B, G>(
    query: web::Query<OrderListQuery>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore,
    G: PaymentGatewayClient,
{
    debug!("💻️ GET orders");
    let orders = api.orders(query.into_inner().into()).await?;
    let count = orders.len();
    Ok(HttpResponse::Ok().json(OrderListResponse { success: true, count, orders }))
}

route!(order_by_id => Get "/{order_id}" impl OrderStore, PaymentGatewayClient);
pub async fn order_by_id<B, G>(
    path: web::Path<String>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore,
    G: PaymentGatewayClient,
{
    let order_id = OrderId(path.into_inner());
    debug!("💻️ GET order {order_id}");
    let order = api.order(&order_id).await?;
    Ok(HttpResponse::Ok().json(OrderResponse { success: true, order }))
}

route!(order_audit => Get "/{order_id}/audit" impl OrderStore, PaymentGatewayClient);
/// An order together with its full status history and fulfillment record. Debugging aid.
pub async fn order_audit<B, G>(
    path: web::Path<String>,
    api: web::Data<CheckoutApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderStore,
    G: PaymentGatewayClient,
{
    let order_id = OrderId(path.into_inner());
    debug!("💻️ GET audit for order {order_id}");
    let audit = api.order_audit(&order_id).await?;
    Ok(HttpResponse::Ok().json(OrderAuditResponse { success: true, audit }))
}
