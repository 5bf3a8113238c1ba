//! Given an AppState, build an initialized Actix **test service** wrapped in
//! the production middleware stack.

use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::web::{self, ServiceConfig};
use actix_web::{App, Error as ActixError};

use crate::middleware::{RequestTrace, StructuredLogger, TraceSpan};
use crate::state::app_state::AppState;

type RoutesFn = Box<dyn FnOnce(&mut ServiceConfig) + Send>;

pub fn create_test_app_builder(state: AppState) -> TestAppBuilder {
    TestAppBuilder {
        state,
        router: Router::Prod,
    }
}

enum Router {
    Prod,
    Custom(RoutesFn),
}

pub struct TestAppBuilder {
    state: AppState,
    router: Router,
}

impl TestAppBuilder {
    /// Use custom routes instead of the application's routes.
    pub fn with_routes<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut ServiceConfig) + Send + 'static,
    {
        self.router = Router::Custom(Box::new(f));
        self
    }

    pub async fn build(
        self,
    ) -> impl Service<actix_http::Request, Response = ServiceResponse<BoxBody>, Error = ActixError>
    {
        let app = App::new()
            .app_data(web::Data::new(self.state))
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace);

        let app = match self.router {
            Router::Prod => app.configure(crate::routes::configure),
            Router::Custom(f) => app.configure(f),
        };

        actix_web::test::init_service(app).await
    }
}
