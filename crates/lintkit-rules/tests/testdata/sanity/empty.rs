// Code generated by sanity-fixtures. DO NOT EDIT.
