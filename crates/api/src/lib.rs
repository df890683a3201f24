//! HTTP surface of kb-slack.
//!
//! - `POST /api/notifications/users/{user_id}`: notify a user
//! - `POST /api/notifications/projects/{project_id}`: notify a project
//! - `GET|PUT /api/users/{id}/integrations/slack`: user integration settings
//! - `GET|PUT /api/projects/{id}/integrations/slack`: project integration settings
//! - `GET /health`

pub mod routes;
pub mod state;
