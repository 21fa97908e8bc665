use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::{
        HeaderName, HeaderValue, Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gradebook::auth::{AuthenticatedUser, JwtService, optional_auth_middleware};
use gradebook::config::AppConfig;
use gradebook::graphql::{ApiSchema, create_schema};
use gradebook::seed::seed_defaults;
use gradebook::services::{
    AcademicYearService, AssessmentStageService, AssignmentService, ClassService, GradeService,
    SemesterService, StudentService, SubjectConfigService, SubjectService, UserService,
};

#[derive(Clone)]
struct AppState {
    schema: ApiSchema,
    db: DatabaseConnection,
    is_development: bool,
    academic_year_service: AcademicYearService,
    semester_service: SemesterService,
    class_service: ClassService,
    subject_service: SubjectService,
    stage_service: AssessmentStageService,
    subject_config_service: SubjectConfigService,
    user_service: UserService,
    assignment_service: AssignmentService,
    student_service: StudentService,
    grade_service: GradeService,
}

async fn graphql_handler(
    State(state): State<AppState>,
    Extension(user): Extension<Option<AuthenticatedUser>>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();

    if let Some(claimed) = user {
        match state.user_service.resolve_caller(&claimed).await {
            Ok(Some(caller)) => request = request.data(caller),
            Ok(None) => {}
            Err(e) => error!("Failed to load caller {}: {}", claimed.id, e),
        }
    }

    request = request
        .data(state.academic_year_service.clone())
        .data(state.semester_service.clone())
        .data(state.class_service.clone())
        .data(state.subject_service.clone())
        .data(state.stage_service.clone())
        .data(state.subject_config_service.clone())
        .data(state.user_service.clone())
        .data(state.assignment_service.clone())
        .data(state.student_service.clone())
        .data(state.grade_service.clone());

    state.schema.execute(request).await.into()
}

async fn graphql_playground() -> impl IntoResponse {
    Html(
        r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>Gradebook GraphQL Playground</title>
        <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/graphql-playground-react/build/static/css/index.css" />
    </head>
    <body>
        <div id="root"></div>
        <script src="https://cdn.jsdelivr.net/npm/graphql-playground-react/build/static/js/middleware.js"></script>
        <script>
            GraphQLPlayground.init(document.getElementById('root'), {
                endpoint: '/graphql'
            })
        </script>
    </body>
    </html>
    "#,
    )
}

async fn health(State(state): State<AppState>) -> Response {
    match state.db.ping().await {
        Ok(()) => Json(serde_json::json!({ "status": "ok" })).into_response(),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

async fn graphql_schema(State(state): State<AppState>) -> Response {
    if !state.is_development {
        return (StatusCode::NOT_FOUND, "Schema not available in production").into_response();
    }

    ([(CONTENT_TYPE, "application/graphql")], state.schema.sdl()).into_response()
}

fn cors_layer(cors_origins: &str) -> CorsLayer {
    if cors_origins.trim() == "*" {
        warn!("CORS set to accept ANY origin (*), only use in development");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = cors_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gradebook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    info!("Starting gradebook in {} environment", config.environment);

    info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;
    info!("Database connected and migrated");

    seed_defaults(&db, &config.seed, config.bcrypt_cost).await?;

    let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);

    let app_state = AppState {
        schema: create_schema(),
        is_development: config.is_development(),
        academic_year_service: AcademicYearService::new(db.clone()),
        semester_service: SemesterService::new(db.clone()),
        class_service: ClassService::new(db.clone()),
        subject_service: SubjectService::new(db.clone()),
        stage_service: AssessmentStageService::new(db.clone()),
        subject_config_service: SubjectConfigService::new(db.clone()),
        user_service: UserService::new(db.clone(), jwt_service.clone(), config.bcrypt_cost),
        assignment_service: AssignmentService::new(db.clone()),
        student_service: StudentService::new(db.clone()),
        grade_service: GradeService::new(db.clone()),
        db,
    };

    let app = Router::new()
        .route("/graphql", post(graphql_handler))
        .route("/playground", get(graphql_playground))
        .route("/health", get(health))
        .route("/schema.graphql", get(graphql_schema))
        .layer(cors_layer(&config.cors_origins))
        .layer(middleware::from_fn_with_state(
            jwt_service,
            optional_auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server starting on http://{}", addr);
    info!("GraphQL Playground available at http://{}/playground", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
