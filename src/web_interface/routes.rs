use std::convert::Infallible;

use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;
use warp::{http::StatusCode, reply, reply::Response, Filter, Rejection, Reply};

use super::assets::dashboard_routes;
use super::types::{ApiError, HealthResponse, Services};
use crate::attendance::RegistroPresenca;
use crate::council::{NovaCamara, NovoVereador};
use crate::error_handling::types::WorkflowError;
use crate::session_management::{NovaSessao, SessaoUpdate};
use crate::storage::{ProjetoFilter, SessaoFilter};
use crate::voting::{NovoProjeto, NovoVoto};

const MAX_BODY_BYTES: u64 = 64 * 1024;

fn with_services(
    services: Services,
) -> impl Filter<Extract = (Services,), Error = Infallible> + Clone {
    warp::any().map(move || services.clone())
}

fn json_body<T: DeserializeOwned + Send>(
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn status_of(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
        WorkflowError::NotFound { .. } => StatusCode::NOT_FOUND,
        WorkflowError::InvalidTransition { .. }
        | WorkflowError::InvalidState { .. }
        | WorkflowError::VotingClosed { .. }
        | WorkflowError::DuplicateVote { .. } => StatusCode::CONFLICT,
        WorkflowError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_reply(err: WorkflowError) -> Response {
    let status = status_of(&err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {}", err);
    } else {
        debug!("Request rejected: {}", err);
    }
    reply::with_status(
        reply::json(&ApiError {
            error: err.kind(),
            message: err.to_string(),
        }),
        status,
    )
    .into_response()
}

fn respond<T: Serialize>(
    result: Result<T, WorkflowError>,
    status: StatusCode,
) -> Result<Response, Rejection> {
    Ok(match result {
        Ok(value) => reply::with_status(reply::json(&value), status).into_response(),
        Err(err) => error_reply(err),
    })
}

fn no_content(result: Result<(), WorkflowError>) -> Result<Response, Rejection> {
    Ok(match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_reply(err),
    })
}

/// GET /health
pub fn health_route() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("health").and(warp::path::end()).and(warp::get()).map(|| {
        reply::json(&HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        })
    })
}

/// /camaras and /camaras/:id/vereadores
pub fn camara_routes(
    services: Services,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let create = warp::path!("camaras")
        .and(warp::post())
        .and(json_body::<NovaCamara>())
        .and(with_services(services.clone()))
        .and_then(|nova: NovaCamara, s: Services| async move {
            respond(s.camaras.create_camara(nova).await, StatusCode::CREATED)
        });

    let get = warp::path!("camaras" / Uuid)
        .and(warp::get())
        .and(with_services(services.clone()))
        .and_then(|id: Uuid, s: Services| async move {
            respond(s.camaras.get_camara(id).await, StatusCode::OK)
        });

    let delete = warp::path!("camaras" / Uuid)
        .and(warp::delete())
        .and(with_services(services.clone()))
        .and_then(|id: Uuid, s: Services| async move {
            no_content(s.camaras.delete_camara(id).await)
        });

    let add_vereador = warp::path!("camaras" / Uuid / "vereadores")
        .and(warp::post())
        .and(json_body::<NovoVereador>())
        .and(with_services(services.clone()))
        .and_then(|camara_id: Uuid, novo: NovoVereador, s: Services| async move {
            respond(s.camaras.add_vereador(camara_id, novo).await, StatusCode::CREATED)
        });

    let list_vereadores = warp::path!("camaras" / Uuid / "vereadores")
        .and(warp::get())
        .and(with_services(services))
        .and_then(|camara_id: Uuid, s: Services| async move {
            respond(s.camaras.list_vereadores(camara_id).await, StatusCode::OK)
        });

    create.or(get).or(delete).or(add_vereador).or(list_vereadores)
}

/// /sessoes and the session transitions
pub fn sessao_routes(
    services: Services,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let create = warp::path!("sessoes")
        .and(warp::post())
        .and(json_body::<NovaSessao>())
        .and(with_services(services.clone()))
        .and_then(|nova: NovaSessao, s: Services| async move {
            respond(s.sessoes.create(nova).await, StatusCode::CREATED)
        });

    let list = warp::path!("sessoes")
        .and(warp::get())
        .and(warp::query::<SessaoFilter>())
        .and(with_services(services.clone()))
        .and_then(|filter: SessaoFilter, s: Services| async move {
            respond(s.sessoes.list(filter).await, StatusCode::OK)
        });

    let get = warp::path!("sessoes" / Uuid)
        .and(warp::get())
        .and(with_services(services.clone()))
        .and_then(|id: Uuid, s: Services| async move {
            respond(s.sessoes.get(id).await, StatusCode::OK)
        });

    let update = warp::path!("sessoes" / Uuid)
        .and(warp::patch())
        .and(json_body::<SessaoUpdate>())
        .and(with_services(services.clone()))
        .and_then(|id: Uuid, update: SessaoUpdate, s: Services| async move {
            respond(s.sessoes.update(id, update).await, StatusCode::OK)
        });

    let delete = warp::path!("sessoes" / Uuid)
        .and(warp::delete())
        .and(with_services(services.clone()))
        .and_then(|id: Uuid, s: Services| async move { no_content(s.sessoes.delete(id).await) });

    let iniciar = warp::path!("sessoes" / Uuid / "iniciar")
        .and(warp::post())
        .and(with_services(services.clone()))
        .and_then(|id: Uuid, s: Services| async move {
            respond(s.sessoes.iniciar(id).await, StatusCode::OK)
        });

    let finalizar = warp::path!("sessoes" / Uuid / "finalizar")
        .and(warp::post())
        .and(with_services(services.clone()))
        .and_then(|id: Uuid, s: Services| async move {
            respond(s.sessoes.finalizar(id).await, StatusCode::OK)
        });

    let cancelar = warp::path!("sessoes" / Uuid / "cancelar")
        .and(warp::post())
        .and(with_services(services))
        .and_then(|id: Uuid, s: Services| async move {
            respond(s.sessoes.cancelar(id).await, StatusCode::OK)
        });

    create
        .or(list)
        .or(get)
        .or(update)
        .or(delete)
        .or(iniciar)
        .or(finalizar)
        .or(cancelar)
}

async fn registrar_presenca(
    sessao_id: Uuid,
    vereador_id: Uuid,
    registro: RegistroPresenca,
    s: Services,
) -> Result<Response, Rejection> {
    let result = s
        .presencas
        .registrar_presenca(sessao_id, vereador_id, registro.presente)
        .await;
    respond(result, StatusCode::OK)
}

/// /sessoes/:id/presencas
pub fn presenca_routes(
    services: Services,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let registrar = warp::path!("sessoes" / Uuid / "presencas" / Uuid)
        .and(warp::put())
        .and(json_body::<RegistroPresenca>())
        .and(with_services(services.clone()))
        .and_then(registrar_presenca);

    let listar = warp::path!("sessoes" / Uuid / "presencas")
        .and(warp::get())
        .and(with_services(services.clone()))
        .and_then(|sessao_id: Uuid, s: Services| async move {
            respond(s.presencas.listar_presencas(sessao_id).await, StatusCode::OK)
        });

    let ausentes = warp::path!("sessoes" / Uuid / "presencas" / "ausentes")
        .and(warp::post())
        .and(with_services(services))
        .and_then(|sessao_id: Uuid, s: Services| async move {
            match s.presencas.marcar_todos_ausentes(sessao_id).await {
                Ok(report) if report.has_failures() => {
                    respond(Ok(report), StatusCode::MULTI_STATUS)
                }
                other => respond(other, StatusCode::OK),
            }
        });

    registrar.or(listar).or(ausentes)
}

/// /projetos and the voting endpoints
pub fn projeto_routes(
    services: Services,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let apresentar = warp::path!("projetos")
        .and(warp::post())
        .and(json_body::<NovoProjeto>())
        .and(with_services(services.clone()))
        .and_then(|novo: NovoProjeto, s: Services| async move {
            respond(s.votacao.apresentar(novo).await, StatusCode::CREATED)
        });

    let list = warp::path!("projetos")
        .and(warp::get())
        .and(warp::query::<ProjetoFilter>())
        .and(with_services(services.clone()))
        .and_then(|filter: ProjetoFilter, s: Services| async move {
            respond(s.votacao.list_projetos(filter).await, StatusCode::OK)
        });

    let get = warp::path!("projetos" / Uuid)
        .and(warp::get())
        .and(with_services(services.clone()))
        .and_then(|id: Uuid, s: Services| async move {
            respond(s.votacao.get_projeto(id).await, StatusCode::OK)
        });

    let iniciar = warp::path!("projetos" / Uuid / "votacao" / "iniciar")
        .and(warp::post())
        .and(with_services(services.clone()))
        .and_then(|id: Uuid, s: Services| async move {
            respond(s.votacao.iniciar_votacao(id).await, StatusCode::OK)
        });

    let votar = warp::path!("projetos" / Uuid / "votos")
        .and(warp::post())
        .and(json_body::<NovoVoto>())
        .and(with_services(services.clone()))
        .and_then(|id: Uuid, novo: NovoVoto, s: Services| async move {
            respond(
                s.votacao.votar(id, novo.vereador_id, &novo.voto).await,
                StatusCode::CREATED,
            )
        });

    let votos = warp::path!("projetos" / Uuid / "votos")
        .and(warp::get())
        .and(with_services(services.clone()))
        .and_then(|id: Uuid, s: Services| async move {
            respond(s.votacao.listar_votos(id).await, StatusCode::OK)
        });

    let apuracao = warp::path!("projetos" / Uuid / "apuracao")
        .and(warp::get())
        .and(with_services(services.clone()))
        .and_then(|id: Uuid, s: Services| async move {
            respond(s.votacao.contar_votos(id).await, StatusCode::OK)
        });

    let finalizar = warp::path!("projetos" / Uuid / "votacao" / "finalizar")
        .and(warp::post())
        .and(with_services(services))
        .and_then(|id: Uuid, s: Services| async move {
            respond(s.votacao.finalizar_votacao(id).await, StatusCode::OK)
        });

    apresentar
        .or(list)
        .or(get)
        .or(iniciar)
        .or(votar)
        .or(votos)
        .or(apuracao)
        .or(finalizar)
}

/// Turns warp rejections (unknown route, bad body, bad query) into the API error payload.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, kind, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not_found", "route not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, "validation", e.to_string())
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, "validation", e.to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "validation",
            "request body too large".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            "method not allowed".to_string(),
        )
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "internal error".to_string(),
        )
    };

    Ok(reply::with_status(
        reply::json(&ApiError {
            error: kind,
            message,
        }),
        status,
    ))
}

/// Every route of the HTTP API, with rejections mapped to JSON errors.
pub fn api(
    services: Services,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    dashboard_routes()
        .or(health_route())
        .or(camara_routes(services.clone()))
        .or(sessao_routes(services.clone()))
        .or(presenca_routes(services.clone()))
        .or(projeto_routes(services))
        .recover(handle_rejection)
}
