//! Catalog lookup handler

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{AppError, AppState};
use shelf_core::BookView;

/// GET /api/book/:index - Get one book, wrapping around in both directions
///
/// Any integer is accepted: `-1` is the last book, `len` is the first again.
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(index): Path<String>,
) -> Result<Json<BookView>, AppError> {
    let index: i64 = index
        .trim()
        .parse()
        .map_err(|_| AppError::bad_request("Invalid book index"))?;

    let book = state.catalog.get(index).map_err(AppError::from_core)?;
    Ok(Json(book))
}
