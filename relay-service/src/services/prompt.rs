//! Prompt construction: the catalog rendered as text plus the user's question.

use crate::models::Catalog;
use std::fmt::Write;

/// Token the model is expected to continue from.
pub const TURN_MARKER: &str = "Assistant:";

/// Label preceding the user's question in the prompt.
pub const QUESTION_LABEL: &str = "User question:";

const CONTEXT_HEADER: &str = "Movie Database Information:";

const PREAMBLE: &str = "\
You are a helpful movie expert assistant. Answer questions based strictly on the following movie database.
If the question is not related to movies in the database, politely inform the user that you can only answer questions about movies in your database.

Do not fabricate or make up information about movies that aren't in the database.

Format your responses with:
- Proper spacing between paragraphs (use double line breaks)
- Well-organized bullet points or numbered lists when appropriate
- Consistent heading styles when needed
- Clear visual separation between different parts of your answer";

/// Render every catalog entry, in order, as a blank-line separated block.
pub fn build_context(catalog: &Catalog) -> String {
    let mut context = format!("{}\n\n", CONTEXT_HEADER);

    for movie in catalog.movies() {
        // Writing into a String cannot fail.
        let _ = write!(
            context,
            "Title: {}\nYear: {}\nDirector: {}\nGenre: {}\nPlot: {}\nActors: {}\nRating: {}\n\n",
            movie.title,
            movie.year,
            movie.director,
            movie.genre.join(", "),
            movie.plot,
            movie.actors.join(", "),
            movie.rating,
        );
    }

    context
}

/// Full prompt sent upstream, ending with [`TURN_MARKER`].
pub fn compose_prompt(context: &str, message: &str) -> String {
    format!(
        "{PREAMBLE}\n\nHere's the movie database information:\n\n{context}\n{QUESTION_LABEL} {message}\n\n{TURN_MARKER}"
    )
}
