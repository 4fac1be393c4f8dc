//! `todoql comment` for adding, listing and deleting comments on todos.

use super::delete::DeleteResponse;
use clap::{Args, Subcommand};
use serde::Serialize;
use todoql_db::{Comment, CommentRepository, CommentStore, DbResult, NewComment, TodoStore};

#[derive(Debug, Args)]
pub struct CommentCommand {
    #[command(subcommand)]
    pub action: CommentAction,
}

#[derive(Debug, Subcommand)]
pub enum CommentAction {
    /// Add a comment to a todo
    Add(CommentAddArgs),
    /// List the comments on a todo, oldest first
    List(CommentListArgs),
    /// Delete a comment
    Delete(CommentDeleteArgs),
}

#[derive(Debug, Args)]
pub struct CommentAddArgs {
    /// Todo ID to comment on
    pub todo_id: String,

    /// Comment text
    pub text: String,

    /// Commenting user
    #[arg(short, long)]
    pub user: String,
}

#[derive(Debug, Args)]
pub struct CommentListArgs {
    /// Todo ID
    pub todo_id: String,
}

#[derive(Debug, Args)]
pub struct CommentDeleteArgs {
    /// Comment ID
    pub id: String,
}

/// Result of a comment action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommentOutcome {
    Added(Comment),
    Listed(Vec<Comment>),
    Deleted(DeleteResponse),
}

impl CommentCommand {
    /// Execute the chosen comment action.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` when the todo is missing,
    /// `DbError::CommentNotFound` when deleting an unknown comment.
    pub async fn execute<S: TodoStore + CommentStore>(
        &self,
        store: &S,
    ) -> DbResult<CommentOutcome> {
        let repo = CommentRepository::new(store);
        match &self.action {
            CommentAction::Add(args) => {
                let input =
                    NewComment::new(args.todo_id.clone(), args.user.clone(), args.text.clone());
                repo.add(input).await.map(CommentOutcome::Added)
            }
            CommentAction::List(args) => {
                repo.list(&args.todo_id).await.map(CommentOutcome::Listed)
            }
            CommentAction::Delete(args) => {
                repo.delete(&args.id).await?;
                Ok(CommentOutcome::Deleted(DeleteResponse {
                    id: args.id.clone(),
                    success: true,
                    message: format!("Comment {} deleted", args.id),
                }))
            }
        }
    }
}
