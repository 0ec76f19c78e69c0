use schoolplanner_core::db::{open_db, open_db_in_memory};
use schoolplanner_core::repo::preference_repo::{PreferenceRepository, SqlitePreferenceRepository};
use schoolplanner_core::service::settings_service::{
    NotificationIdCounter, SettingsService, NOTIFICATIONS_NAMESPACE,
};
use schoolplanner_core::{NotificationPriority, NotificationSettings};

#[test]
fn defaults_apply_to_fresh_store() {
    let conn = open_db_in_memory().unwrap();
    let service = SettingsService::new(SqlitePreferenceRepository::try_new(&conn).unwrap());

    let settings = service.load_notification_settings().unwrap();

    assert_eq!(settings.target_hour, 12);
    assert_eq!(settings.priority, NotificationPriority::Default);
    assert_eq!(service.notification_counter().unwrap().last(), 0);
}

#[test]
fn saved_settings_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planner.sqlite3");
    {
        let conn = open_db(&path).unwrap();
        let service = SettingsService::new(SqlitePreferenceRepository::try_new(&conn).unwrap());
        let settings = NotificationSettings::new(7, NotificationPriority::High).unwrap();
        service.save_notification_settings(&settings).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let service = SettingsService::new(SqlitePreferenceRepository::try_new(&conn).unwrap());
    assert_eq!(
        service.load_notification_settings().unwrap(),
        NotificationSettings {
            target_hour: 7,
            priority: NotificationPriority::High
        }
    );
}

#[test]
fn corrupt_values_fall_back_to_defaults() {
    let conn = open_db_in_memory().unwrap();
    let prefs = SqlitePreferenceRepository::try_new(&conn).unwrap();
    prefs
        .set_value(NOTIFICATIONS_NAMESPACE, "target_hour", "noon")
        .unwrap();
    prefs
        .set_value(NOTIFICATIONS_NAMESPACE, "priority", "blaring")
        .unwrap();
    let service = SettingsService::new(prefs);

    assert_eq!(
        service.load_notification_settings().unwrap(),
        NotificationSettings::default()
    );
}

#[test]
fn out_of_range_hour_is_not_saved() {
    let conn = open_db_in_memory().unwrap();
    let service = SettingsService::new(SqlitePreferenceRepository::try_new(&conn).unwrap());

    let invalid = NotificationSettings {
        target_hour: 30,
        priority: NotificationPriority::Low,
    };
    assert!(service.save_notification_settings(&invalid).is_err());
    assert_eq!(service.load_notification_settings().unwrap().target_hour, 12);
}

#[test]
fn persisted_counter_never_moves_backwards() {
    let conn = open_db_in_memory().unwrap();
    let service = SettingsService::new(SqlitePreferenceRepository::try_new(&conn).unwrap());

    let mut counter = service.notification_counter().unwrap();
    counter.next_id();
    counter.next_id();
    service.persist_counter(&counter).unwrap();
    assert_eq!(service.notification_counter().unwrap().last(), 2);

    service
        .persist_counter(&NotificationIdCounter::starting_after(1))
        .unwrap();
    assert_eq!(service.notification_counter().unwrap().last(), 2);
}

#[test]
fn preference_values_upsert_and_remove() {
    let conn = open_db_in_memory().unwrap();
    let prefs = SqlitePreferenceRepository::try_new(&conn).unwrap();

    prefs.set_i64("misc", "answer", 41).unwrap();
    prefs.set_i64("misc", "answer", 42).unwrap();
    assert_eq!(prefs.get_i64("misc", "answer").unwrap(), Some(42));
    assert_eq!(prefs.get_value("other", "answer").unwrap(), None);

    assert!(prefs.remove_value("misc", "answer").unwrap());
    assert!(!prefs.remove_value("misc", "answer").unwrap());
}
