/**
 * Grid Route Handlers
 *
 * # Routes
 *
 * - `GET /ws` - WebSocket upgrade into a grid session
 */

use axum::Router;

use crate::backend::server::state::AppState;
use crate::backend::session::handle_ws_upgrade;

/// Configure grid routes
///
/// This function adds the following routes to the router:
/// - `GET /ws` - WebSocket session (snapshot, then live updates)
pub fn configure_grid_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/ws", axum::routing::get(handle_ws_upgrade))
}
