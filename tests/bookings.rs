mod common;

use common::{admin, day, guest, seed_hotel, test_pool};
use hotel_booking_api::errors::ApiError;
use hotel_booking_api::inventory::{availability, booking};
use hotel_booking_api::models::booking::{BookingStatus, CreateBooking};
use hotel_booking_api::models::hotel::RoomType;

fn double_booking(hotel_id: i64, check_in: &str, check_out: &str) -> CreateBooking {
    CreateBooking {
        hotel_id,
        room_type: RoomType::Double,
        check_in: day(check_in),
        check_out: day(check_out),
        guests: 2,
    }
}

#[tokio::test]
async fn book_until_full_then_cancel_frees_the_room() {
    let pool = test_pool().await;
    let hotel_id = seed_hotel(&pool, "Hotel X", "Madrid", &[(RoomType::Double, 2, 100.0)]).await;
    let range = ("2025-01-10", "2025-01-12");

    // Book A: succeeds, two nights at 100.
    let (booking_a, hotel) =
        booking::create_booking(&pool, guest(1), &double_booking(hotel_id, range.0, range.1))
            .await
            .unwrap();
    assert_eq!(booking_a.total_price, 200.0);
    assert_eq!(booking_a.status, BookingStatus::Confirmed);
    assert_eq!(hotel.id, hotel_id);

    // Book B: same range, takes the last room.
    let (booking_b, _) =
        booking::create_booking(&pool, guest(2), &double_booking(hotel_id, range.0, range.1))
            .await
            .unwrap();
    assert_eq!(booking_b.total_price, 200.0);

    let full = availability::check(&pool, hotel_id, RoomType::Double, day(range.0), day(range.1))
        .await
        .unwrap();
    assert_eq!(full.available, 0);

    // Book C: no capacity left.
    let err = booking::create_booking(&pool, guest(3), &double_booking(hotel_id, range.0, range.1))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::CapacityExceeded));

    // Cancel A: capacity comes back.
    booking::set_status(&pool, booking_a.id, BookingStatus::Cancelled)
        .await
        .unwrap();
    let freed = availability::check(&pool, hotel_id, RoomType::Double, day(range.0), day(range.1))
        .await
        .unwrap();
    assert_eq!(freed.available, 1);

    // Book D: fills the freed room.
    booking::create_booking(&pool, guest(4), &double_booking(hotel_id, range.0, range.1))
        .await
        .unwrap();
}

#[tokio::test]
async fn adjacent_stay_books_regardless_of_occupancy() {
    let pool = test_pool().await;
    let hotel_id = seed_hotel(&pool, "Hotel X", "Madrid", &[(RoomType::Double, 2, 100.0)]).await;

    for user_id in 1..=2 {
        booking::create_booking(
            &pool,
            guest(user_id),
            &double_booking(hotel_id, "2025-01-10", "2025-01-12"),
        )
        .await
        .unwrap();
    }

    // Starts exactly when the prior stays end.
    booking::create_booking(
        &pool,
        guest(3),
        &double_booking(hotel_id, "2025-01-12", "2025-01-14"),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn admins_cannot_create_bookings() {
    let pool = test_pool().await;
    let hotel_id = seed_hotel(&pool, "Hotel X", "Madrid", &[(RoomType::Double, 2, 100.0)]).await;

    let err = booking::create_booking(
        &pool,
        admin(1),
        &double_booking(hotel_id, "2025-01-10", "2025-01-12"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn rejects_bad_input_and_unknown_targets() {
    let pool = test_pool().await;
    let hotel_id = seed_hotel(&pool, "Hotel X", "Madrid", &[(RoomType::Double, 2, 100.0)]).await;

    // check_out before check_in.
    let err = booking::create_booking(
        &pool,
        guest(1),
        &double_booking(hotel_id, "2025-01-12", "2025-01-10"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    // Zero guests.
    let mut zero_guests = double_booking(hotel_id, "2025-01-10", "2025-01-12");
    zero_guests.guests = 0;
    let err = booking::create_booking(&pool, guest(1), &zero_guests)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    // Unknown hotel.
    let err = booking::create_booking(
        &pool,
        guest(1),
        &double_booking(hotel_id + 99, "2025-01-10", "2025-01-12"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    // Room type the hotel does not carry.
    let mut wrong_room = double_booking(hotel_id, "2025-01-10", "2025-01-12");
    wrong_room.room_type = RoomType::Suite;
    let err = booking::create_booking(&pool, guest(1), &wrong_room)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    // Nothing was written along the way.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn cancelled_bookings_stay_cancelled() {
    let pool = test_pool().await;
    let hotel_id = seed_hotel(&pool, "Hotel X", "Madrid", &[(RoomType::Double, 2, 100.0)]).await;

    let (created, _) = booking::create_booking(
        &pool,
        guest(1),
        &double_booking(hotel_id, "2025-01-10", "2025-01-12"),
    )
    .await
    .unwrap();

    booking::set_status(&pool, created.id, BookingStatus::Cancelled)
        .await
        .unwrap();

    let err = booking::set_status(&pool, created.id, BookingStatus::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    // The row is still there, soft-cancelled.
    let status: String = sqlx::query_scalar("SELECT status FROM bookings WHERE id = ?")
        .bind(created.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "cancelled");
}

#[tokio::test]
async fn operator_can_confirm_a_pending_booking() {
    let pool = test_pool().await;
    let hotel_id = seed_hotel(&pool, "Hotel X", "Madrid", &[(RoomType::Double, 2, 100.0)]).await;

    let booking_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO bookings (user_id, hotel_id, room_type, check_in, check_out, guests, total_price, status)
        VALUES (1, ?, 'Double', ?, ?, 1, 200.0, 'pending')
        RETURNING id
        "#,
    )
    .bind(hotel_id)
    .bind(day("2025-01-10"))
    .bind(day("2025-01-12"))
    .fetch_one(&pool)
    .await
    .unwrap();

    let updated = booking::set_status(&pool, booking_id, BookingStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(updated.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn unknown_booking_is_not_found() {
    let pool = test_pool().await;
    let err = booking::set_status(&pool, 9999, BookingStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_bookings_never_oversell() {
    let pool = test_pool().await;
    let hotel_id = seed_hotel(&pool, "Hotel X", "Madrid", &[(RoomType::Double, 2, 100.0)]).await;

    let mut handles = Vec::new();
    for user_id in 1..=8 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            booking::create_booking(
                &pool,
                guest(user_id),
                &CreateBooking {
                    hotel_id,
                    room_type: RoomType::Double,
                    check_in: day("2025-01-10"),
                    check_out: day("2025-01-12"),
                    guests: 1,
                },
            )
            .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(err) => assert!(matches!(err, ApiError::CapacityExceeded)),
        }
    }
    assert_eq!(succeeded, 2);

    let confirmed: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bookings WHERE hotel_id = ? AND status = 'confirmed'",
    )
    .bind(hotel_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(confirmed, 2);
}
