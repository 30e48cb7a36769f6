//! Integration tests: the HTTP API end to end against in-memory and
//! wiremock-backed providers, the offline training job, and the bot's
//! backend round trip.

mod api;
mod bot_backend;
mod mock_weather;
mod training;
mod weather_clients;
