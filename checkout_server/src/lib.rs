//! # Checkout payment server
//!
//! This module hosts the HTTP surface of the checkout payment service. It is responsible for:
//! * Accepting checkout requests from storefronts and creating payment sessions on the gateway.
//! * Serving payment status queries, with a short read-through cache over the gateway.
//! * Listening for incoming webhook notifications from the payment gateway and reconciling them onto orders.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/payments/transactions`: Create a payment session for a new order.
//! * `/payments/{order_id}/status`: Query the payment status of an order.
//! * `/payments/notifications`: The webhook route for gateway payment notifications.
//! * `/orders` and `/orders/{order_id}`: Order listing and retrieval.
//! * `/orders/{order_id}/audit`: An order with its full status history, for debugging.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
