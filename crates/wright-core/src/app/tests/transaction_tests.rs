use crate::app::TransactionManager;
use crate::service::{AppService, ServiceError};

#[test]
fn test_begin_commit_rollback() {
    let manager = TransactionManager::new();
    let first = manager.begin();
    let second = manager.begin();
    assert_ne!(first, second);
    assert_eq!(manager.open_transactions(), 2);

    manager.commit(first).unwrap();
    manager.rollback(second).unwrap();
    assert_eq!(manager.open_transactions(), 0);

    assert!(matches!(
        manager.commit(first),
        Err(ServiceError::UnknownTransaction(id)) if id == first.value()
    ));
}

#[tokio::test]
async fn test_stop_rolls_back_open_transactions() {
    let manager = TransactionManager::new();
    manager.begin();
    manager.begin();

    manager.stop().await.unwrap();
    assert_eq!(manager.open_transactions(), 0);
}
