mod jwt_extract;
mod logout;
mod rights;
