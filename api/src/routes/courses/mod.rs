pub mod courses_route;
