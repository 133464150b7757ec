//! Delete command handler.

use crate::api::{self, Mode};
use crate::args::DeleteArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};

/// Deletes the transaction with `args.id`. Returns the deleted id.
///
/// # Errors
///
/// - Returns an error if the store has no transaction of the current user with that id.
pub async fn delete(config: Config, mode: Mode, args: DeleteArgs) -> Result<Out<String>> {
    let mut store = api::store(&config, mode)
        .await
        .pub_result(ErrorType::Config)?;
    store.delete(&args.id).await.pub_result(ErrorType::Store)?;
    Ok(Out::new(
        format!("Deleted transaction {}", args.id),
        args.id,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::TransactionType;
    use crate::test::{transaction, TestEnv};

    #[tokio::test]
    async fn test_delete() {
        let env = TestEnv::new().await;
        let keep = transaction("a2", "10", "2024-03-06", "Lazer", TransactionType::Expense);
        env.set_state(vec![
            transaction("a1", "50", "2024-03-05", "Transporte", TransactionType::Expense),
            keep.clone(),
        ]);
        let args = DeleteArgs {
            id: "a1".to_string(),
        };
        let out = delete(env.config(), env.mode(), args).await.unwrap();
        assert_eq!(out.structure().map(String::as_str), Some("a1"));
        assert_eq!(env.get_state(), vec![keep]);
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let env = TestEnv::new().await;
        let args = DeleteArgs {
            id: "a1".to_string(),
        };
        let err = delete(env.config(), env.mode(), args).await.unwrap_err();
        assert_eq!(error_type(&err), Some(ErrorType::Store));
    }
}
