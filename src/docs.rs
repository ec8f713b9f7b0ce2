use crate::api::attendance::{CheckInDto, CheckOutDto, UpdateAttendanceDto};
use crate::api::office_location::{CreateOfficeLocation, UpdateOfficeLocation};
use crate::api::user::{UpdateUser, UserListResponse, UserQuery, UserResponse};
use crate::model::attendance::AttendanceRecord;
use crate::model::office_location::OfficeLocation;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker API",
        version = "1.0.0",
        description = r#"
## Geofenced Staff Attendance

This API powers a staff attendance/time-tracking system.

### Key Features
- **Check-in / Check-out**
  - Geofenced to configured office locations (2 km haversine radius)
  - One attendance record per user per day, bucketed in the organizational timezone
- **Time Accounting**
  - Worked/overtime/deficit durations in `"{h}h {m}m {s}s"` form
  - Periodic elapsed-time refresh while checked in
- **Administration**
  - Office location CRUD with coordinate validation
  - User management (expected daily hours, roles)

### Security
Endpoints are protected using **JWT Bearer authentication**.
Manager/Admin roles gate the administrative operations.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::refresh,
        crate::api::attendance::my_history,
        crate::api::attendance::my_record,
        crate::api::attendance::day_roster,
        crate::api::attendance::user_record,
        crate::api::attendance::update_record,
        crate::api::attendance::delete_record,

        crate::api::office_location::create_office,
        crate::api::office_location::list_offices,
        crate::api::office_location::get_office,
        crate::api::office_location::get_office_by_name,
        crate::api::office_location::update_office,
        crate::api::office_location::delete_office,

        crate::api::user::list_users,
        crate::api::user::get_user,
        crate::api::user::update_user
    ),
    components(
        schemas(
            AttendanceRecord,
            CheckInDto,
            CheckOutDto,
            UpdateAttendanceDto,
            OfficeLocation,
            CreateOfficeLocation,
            UpdateOfficeLocation,
            UserResponse,
            UserListResponse,
            UserQuery,
            UpdateUser
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Check-in/check-out and attendance records"),
        (name = "Office", description = "Office location management APIs"),
        (name = "User", description = "User management APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
