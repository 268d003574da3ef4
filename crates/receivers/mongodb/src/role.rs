use crate::gateway::{Command, CommandGateway};
use mongodb::bson::{Bson, Document};
use tracing::debug;

/// Whether the connected node is the primary of its replica set, or a
/// standalone server accepting writes.
///
/// Every failure reduces to `false`, so that callers gating on the primary
/// skip collection rather than proceed by mistake.
pub async fn is_primary(gateway: &dyn CommandGateway) -> bool {
    match gateway.fetch(Command::IsMaster).await {
        Ok(result) => is_primary_result(&result),
        Err(err) => {
            debug!("error checking isMaster: {}", err);
            false
        }
    }
}

fn is_primary_result(result: &Document) -> bool {
    let ok = matches!(result.get("ok"), Some(Bson::Double(ok)) if *ok == 1.0)
        || matches!(result.get("ok"), Some(Bson::Int32(1) | Bson::Int64(1)));
    let primary = ["ismaster", "isWritablePrimary"]
        .iter()
        .any(|key| matches!(result.get(key), Some(Bson::Boolean(true))));
    if ok && !primary {
        debug!(
            secondary = ?result.get("secondary"),
            set_name = ?result.get("setName"),
            "node is not primary"
        );
    }
    ok && primary
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn primary_requires_ok_and_flag() {
        assert!(is_primary_result(&doc! { "ismaster": true, "ok": 1.0 }));
        assert!(is_primary_result(&doc! { "isWritablePrimary": true, "ok": 1 }));
        assert!(!is_primary_result(&doc! { "ismaster": false, "secondary": true, "ok": 1.0 }));
        assert!(!is_primary_result(&doc! { "ismaster": true, "ok": 0.0 }));
        assert!(!is_primary_result(&doc! { "ismaster": "yes", "ok": 1.0 }));
        assert!(!is_primary_result(&doc! { "ok": 1.0 }));
    }
}
