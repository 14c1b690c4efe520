use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderName, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    dav_path::{child_href, split_note_name, DavPath},
    dav_xml::{render_multistatus, DavEntry},
    db::{Resolution, Resolved},
    errors::{map_store_error, DavError},
    models::{Note, User},
    AppState,
};

/// The protocol surface is a fixed, finite verb set; everything else is 405.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DavMethod {
    Get,
    Head,
    Put,
    Delete,
    Mkcol,
    Propfind,
    Options,
}

impl TryFrom<&Method> for DavMethod {
    type Error = ();

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        match method.as_str() {
            "GET" => Ok(DavMethod::Get),
            "HEAD" => Ok(DavMethod::Head),
            "PUT" => Ok(DavMethod::Put),
            "DELETE" => Ok(DavMethod::Delete),
            "MKCOL" => Ok(DavMethod::Mkcol),
            "PROPFIND" => Ok(DavMethod::Propfind),
            "OPTIONS" => Ok(DavMethod::Options),
            _ => Err(()),
        }
    }
}

const ALLOWED_METHODS: &str = "OPTIONS, GET, HEAD, PUT, DELETE, MKCOL, PROPFIND";

/// Depth of a PROPFIND listing. Anything this protocol subset does not model
/// (absent, malformed, `infinity`) collapses to one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Depth {
    Zero,
    One,
}

impl Depth {
    fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get("depth").and_then(|v| v.to_str().ok()) {
            Some("0") => Depth::Zero,
            _ => Depth::One,
        }
    }
}

/// WebDAV verbs are dispatched from the router fallback: axum's method
/// routing does not model PROPFIND/MKCOL, and the verb set is closed anyway.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().fallback(dispatch)
}

async fn dispatch(
    State(state): State<Arc<AppState>>,
    auth_user: AuthUser,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = DavPath::parse(uri.path());
    debug!(method = %method, path = %uri.path(), user = %auth_user.user.username, "webdav request");

    let result = match DavMethod::try_from(&method) {
        Ok(DavMethod::Get) => handle_get(&state, &auth_user.user, &path, false).await,
        Ok(DavMethod::Head) => handle_get(&state, &auth_user.user, &path, true).await,
        Ok(DavMethod::Put) => handle_put(&state, &auth_user.user, &path, body).await,
        Ok(DavMethod::Delete) => handle_delete(&state, &auth_user.user, &path).await,
        Ok(DavMethod::Mkcol) => handle_mkcol(&state, &auth_user.user, &path).await,
        Ok(DavMethod::Propfind) => handle_propfind(&state, &auth_user.user, &path, &headers).await,
        Ok(DavMethod::Options) => handle_options(),
        Err(()) => Err(DavError::NotAllowed(format!(
            "unsupported method {method}"
        ))),
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            let response = e.into_response();
            if response.status() == StatusCode::METHOD_NOT_ALLOWED {
                return with_allow_header(response);
            }
            response
        }
    }
}

fn with_allow_header(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::ALLOW,
        header::HeaderValue::from_static(ALLOWED_METHODS),
    );
    response
}

fn handle_options() -> Result<Response, DavError> {
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(HeaderName::from_static("dav"), "1")
        .header(header::ALLOW, ALLOWED_METHODS)
        .body(Body::empty())
        .map_err(anyhow::Error::from)?;
    Ok(response)
}

fn content_type_for(syntax: &str) -> String {
    let mime = mime_guess::from_ext(syntax).first_or_octet_stream();
    let mut content_type = mime.essence_str().to_string();
    if content_type.starts_with("text/") {
        content_type.push_str("; charset=utf-8");
    }
    content_type
}

fn lock_key(user_id: Uuid, path: &DavPath) -> String {
    format!("{}:{}", user_id, path.href(false))
}

async fn handle_get(
    state: &AppState,
    user: &User,
    path: &DavPath,
    head_only: bool,
) -> Result<Response, DavError> {
    match state.db.resolve_path(user.id, path.segments()).await? {
        Resolution::Found(Resolved::Note(note)) => {
            let content_type = content_type_for(&note.syntax);
            if head_only {
                let response = Response::builder()
                    .status(StatusCode::OK)
                    .header(header::CONTENT_TYPE, content_type)
                    .header(header::CONTENT_LENGTH, note.content.len() as u64)
                    .body(Body::empty())
                    .map_err(anyhow::Error::from)?;
                Ok(response)
            } else {
                Ok((
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, content_type)],
                    note.content,
                )
                    .into_response())
            }
        }
        // Collections have no retrievable body in this protocol subset.
        Resolution::Found(_) | Resolution::Missing { .. } => Err(DavError::NotFound),
    }
}

async fn handle_put(
    state: &AppState,
    user: &User,
    path: &DavPath,
    body: Bytes,
) -> Result<Response, DavError> {
    if path.is_root() {
        return Err(DavError::NotAllowed(
            "cannot replace the root collection".to_string(),
        ));
    }
    let name = path.last_segment().unwrap_or_default();
    let Some((title, syntax)) = split_note_name(name) else {
        return Err(DavError::Forbidden(
            "note names require a file extension".to_string(),
        ));
    };

    let _guard = state.locks.acquire(&lock_key(user.id, path)).await;

    match state.db.resolve_path(user.id, path.segments()).await? {
        Resolution::Found(Resolved::Note(note)) => {
            let updated = state
                .db
                .update_note_content(user.id, note.id, &body)
                .await
                .map_err(map_store_error)?;
            if updated == 0 {
                return Err(DavError::Conflict(
                    "resource tree changed concurrently".to_string(),
                ));
            }
            debug!(note_id = %note.id, bytes = body.len(), "updated note");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Resolution::Found(_) => Err(DavError::NotAllowed(
            "a collection already exists at this location".to_string(),
        )),
        Resolution::Missing { index, parent_id } if index == path.segments().len() - 1 => {
            let note = state
                .db
                .create_note(user.id, parent_id.as_ref(), &title, &syntax, &body)
                .await
                .map_err(map_store_error)?;
            debug!(note_id = %note.id, bytes = body.len(), "created note");
            Ok(StatusCode::CREATED.into_response())
        }
        Resolution::Missing { .. } => Err(DavError::Conflict(
            "parent collection does not exist".to_string(),
        )),
    }
}

async fn handle_delete(
    state: &AppState,
    user: &User,
    path: &DavPath,
) -> Result<Response, DavError> {
    if path.is_root() {
        return Err(DavError::Forbidden(
            "the root collection cannot be deleted".to_string(),
        ));
    }

    let _guard = state.locks.acquire(&lock_key(user.id, path)).await;

    match state.db.resolve_path(user.id, path.segments()).await? {
        Resolution::Found(Resolved::Note(note)) => {
            let deleted = state.db.delete_note(user.id, note.id).await?;
            if deleted == 0 {
                return Err(DavError::NotFound);
            }
            debug!(note_id = %note.id, "deleted note");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Resolution::Found(Resolved::Folder(folder)) => {
            // One transactional statement; the schema cascade removes the
            // whole subtree or nothing.
            let deleted = state.db.delete_folder(user.id, folder.id).await?;
            if deleted == 0 {
                return Err(DavError::NotFound);
            }
            debug!(folder_id = %folder.id, "deleted folder subtree");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        // The implicit root only resolves for the empty path, handled above.
        Resolution::Found(Resolved::Root) => Err(DavError::Forbidden(
            "the root collection cannot be deleted".to_string(),
        )),
        Resolution::Missing { .. } => Err(DavError::NotFound),
    }
}

async fn handle_mkcol(
    state: &AppState,
    user: &User,
    path: &DavPath,
) -> Result<Response, DavError> {
    if path.is_root() {
        return Err(DavError::NotAllowed(
            "the root collection already exists".to_string(),
        ));
    }
    let title = path.last_segment().unwrap_or_default();

    let _guard = state.locks.acquire(&lock_key(user.id, path)).await;

    match state.db.resolve_path(user.id, path.segments()).await? {
        Resolution::Found(_) => Err(DavError::NotAllowed(
            "a resource already exists at this location".to_string(),
        )),
        Resolution::Missing { index, parent_id } if index == path.segments().len() - 1 => {
            let folder = state
                .db
                .create_folder(user.id, parent_id.as_ref(), title)
                .await
                .map_err(map_store_error)?;
            debug!(folder_id = %folder.id, title = %folder.title, "created folder");
            Ok(StatusCode::CREATED.into_response())
        }
        Resolution::Missing { .. } => Err(DavError::Conflict(
            "parent collection does not exist".to_string(),
        )),
    }
}

async fn handle_propfind(
    state: &AppState,
    user: &User,
    path: &DavPath,
    headers: &HeaderMap,
) -> Result<Response, DavError> {
    let depth = Depth::from_headers(headers);

    let mut entries = Vec::new();
    match state.db.resolve_path(user.id, path.segments()).await? {
        Resolution::Found(Resolved::Note(note)) => {
            // Notes have no children; depth is irrelevant.
            entries.push(note_entry(path.href(false), &note));
        }
        Resolution::Found(Resolved::Folder(folder)) => {
            let base = path.href(true);
            entries.push(DavEntry::folder(
                base.clone(),
                folder.title.clone(),
                folder.created_at,
                folder.updated_at,
            ));
            if depth == Depth::One {
                push_children(state, user.id, Some(&folder.id), &base, &mut entries).await?;
            }
        }
        Resolution::Found(Resolved::Root) => {
            // The implicit root has no row; it has existed since its owner
            // did, and listing it must not look like a modification.
            let base = path.href(true);
            entries.push(DavEntry::folder(
                base.clone(),
                String::new(),
                user.created_at,
                user.created_at,
            ));
            if depth == Depth::One {
                push_children(state, user.id, None, &base, &mut entries).await?;
            }
        }
        Resolution::Missing { .. } => return Err(DavError::NotFound),
    }

    let xml = render_multistatus(&entries)?;
    Ok((
        StatusCode::MULTI_STATUS,
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        xml,
    )
        .into_response())
}

/// Immediate children only: folders first, then notes, each ordered by title.
/// The order is stable within one response so clients can diff listings.
async fn push_children(
    state: &AppState,
    user_id: Uuid,
    parent_id: Option<&Uuid>,
    base: &str,
    entries: &mut Vec<DavEntry>,
) -> Result<(), DavError> {
    for folder in state.db.list_folders(user_id, parent_id).await? {
        entries.push(DavEntry::folder(
            child_href(base, &folder.title, true),
            folder.title.clone(),
            folder.created_at,
            folder.updated_at,
        ));
    }
    for note in state.db.list_notes(user_id, parent_id).await? {
        entries.push(note_entry(child_href(base, &note.file_name(), false), &note));
    }
    Ok(())
}

fn note_entry(href: String, note: &Note) -> DavEntry {
    DavEntry {
        href,
        display_name: note.file_name(),
        is_collection: false,
        content_length: note.content.len() as u64,
        content_type: Some(content_type_for(&note.syntax)),
        created: note.created_at,
        modified: note.updated_at,
    }
}
