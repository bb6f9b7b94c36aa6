mod checkout;
mod helpers;
mod notifications;
mod orders;
mod status;
